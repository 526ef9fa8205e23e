/// Router Module Index
///
/// Splits the routing table by access level. Public routes carry no credentials check;
/// protected routes each name the permission they require through the `Authorized`
/// extractor in their handler signature.

/// Routes accessible to anonymous clients.
pub mod public;

/// Routes requiring a verified bearer token holding a route-specific permission.
pub mod protected;
