use crate::runtime::compose::OutgoingEmail;

/// Port over the transactional mail-sending service.
pub trait MailService {
    /// Sends one email and returns the service-assigned message id.
    fn send_email(&self, email: &OutgoingEmail) -> Result<String, String>;

    fn list_verified_identities(&self) -> Result<Vec<String>, String>;
}
