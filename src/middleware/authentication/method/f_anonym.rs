use actix_web::dev::ServiceRequest;
use actix_web::HttpMessage;

/// Casbin subject of requests without a bearer token.
pub const ANONYMOUS_ROLE: &str = "anonym";

#[tracing::instrument(name = "authenticate as anonym", skip(req))]
pub fn anonym(req: &mut ServiceRequest) -> Result<bool, String> {
    let accesscontrol_vals = actix_casbin_auth::CasbinVals {
        subject: ANONYMOUS_ROLE.to_string(),
        domain: None,
    };
    if req.extensions_mut().insert(accesscontrol_vals).is_some() {
        return Err("sth wrong with access control".to_string());
    }

    Ok(true)
}
