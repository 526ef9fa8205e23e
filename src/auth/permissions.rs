use super::{AuthError, Claims};

/// check_permissions
///
/// Exact, case-sensitive membership test of `required` in the token's permission set.
/// A token without a `permissions` claim fails differently from one that simply lacks
/// the permission.
pub fn check_permissions(claims: &Claims, required: &str) -> Result<(), AuthError> {
    let permissions = claims
        .permissions
        .as_ref()
        .ok_or(AuthError::PermissionsNotIncludedInToken)?;

    if permissions.contains(required) {
        Ok(())
    } else {
        Err(AuthError::UnauthorizedPermission)
    }
}
