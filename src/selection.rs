/// Chosen day and chosen student. The two axes are independent and neither
/// transition touches the other.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    pub selected_date: Option<String>,
    pub selected_student_id: Option<i64>,
}

impl Selection {
    /// Re-selecting the current date keeps it selected.
    pub fn select_date(self, date: impl Into<String>) -> Self {
        Self {
            selected_date: Some(date.into()),
            ..self
        }
    }

    pub fn select_student(self, student_id: Option<i64>) -> Self {
        Self {
            selected_student_id: student_id,
            ..self
        }
    }

    pub fn is_idle(&self) -> bool {
        self.selected_date.is_none() && self.selected_student_id.is_none()
    }
}
