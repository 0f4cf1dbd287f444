/// People notified about a business unit's report.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Contacts {
    pub emails: Vec<String>,
    pub mobile: Vec<String>,
}

impl Contacts {
    pub fn is_empty(&self) -> bool {
        self.emails.is_empty() && self.mobile.is_empty()
    }
}
