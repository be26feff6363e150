use dealgate_auth::User;

/// Authenticated user for the current request.
///
/// Inserted by the auth middleware after claim reconciliation; present on
/// every request that reaches a protected handler.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);
