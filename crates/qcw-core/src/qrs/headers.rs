//! QRS header values: impersonation, security context and xrfkey.

use crate::users::UserIdentity;

pub const XRFKEY_HEADER: &str = "X-Qlik-Xrfkey";
pub const USER_HEADER: &str = "X-Qlik-User";
pub const SECURITY_HEADER: &str = "X-Qlik-Security";

/// Length of the cross-site request forgery key the QRS expects.
pub const XRFKEY_LEN: usize = 16;

const SECURITY_CONTEXT: &str =
    "SecureRequest=true; LicenseContext=UserAccess; Context=ManagementAccess;";

/// `X-Qlik-User` value impersonating `identity`.
pub fn user_header(identity: &UserIdentity) -> String {
    format!("UserDirectory={}; UserId={}", identity.domain, identity.user)
}

/// `X-Qlik-Security` value. With a suffix, the upper-cased user name plus
/// the suffix is passed as `UserPrincipleName`.
pub fn security_header(user: &str, upn_suffix: Option<&str>) -> String {
    match upn_suffix {
        Some(suffix) => format!(
            "{} UserPrincipleName={}{};",
            SECURITY_CONTEXT,
            user.to_uppercase(),
            suffix
        ),
        None => SECURITY_CONTEXT.to_string(),
    }
}

/// Fresh 16-character alphanumeric xrfkey.
pub fn new_xrfkey() -> String {
    let mut key = uuid::Uuid::new_v4().simple().to_string();
    key.truncate(XRFKEY_LEN);
    key
}
