use async_graphql::SimpleObject;

/// Confirmation returned by the user administration mutations.
#[derive(SimpleObject, Clone, Debug)]
pub struct AdminActionResult {
    pub success: bool,
    pub message: String,
}

impl From<String> for AdminActionResult {
    fn from(message: String) -> Self {
        Self {
            success: true,
            message,
        }
    }
}
