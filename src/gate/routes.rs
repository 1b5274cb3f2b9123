use crate::auth::Role;

/// Path prefixes each role may open
pub fn allowed_prefixes(role: Role) -> &'static [&'static str] {
    match role {
        Role::PartnerSupplier => &[
            "/mural",
            "/recommended-professionals",
            "/store-info",
            "/help",
            "/plans",
            "/payment-confirmed",
            "/payment-confirmation",
        ],
        Role::Professional => &[
            "/mural",
            "/recommended-professionals",
            "/suppliers-store",
            "/workshops",
            "/events",
            "/help",
            "/benefits",
        ],
        Role::LoveDecoration => &["/mural", "/recommended-professionals", "/suppliers-store", "/help"],
    }
}

/// `/` is open to every role; anything else needs a matching prefix.
///
/// Matching is a plain string prefix test, so `/helpdesk` passes for any role
/// that may open `/help`.
pub fn is_path_allowed(role: Role, path: &str) -> bool {
    path == "/" || allowed_prefixes(role).iter().any(|prefix| path.starts_with(prefix))
}
