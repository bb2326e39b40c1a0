use actix_casbin_auth::casbin::function_map::key_match2;
use actix_casbin_auth::casbin::{CoreApi, DefaultModel, FileAdapter};
use actix_casbin_auth::CasbinService;
use std::io::{Error, ErrorKind};

/// Role based access control over request paths. Roles come from the
/// authentication step (`anonym` or the user's role).
pub async fn try_new(model_path: &str, policy_path: &str) -> Result<CasbinService, Error> {
    let model = DefaultModel::from_file(model_path)
        .await
        .map_err(|err| Error::new(ErrorKind::Other, format!("{err:?}")))?;
    let adapter = FileAdapter::new(policy_path.to_string());

    let casbin_service = CasbinService::new(model, adapter)
        .await
        .map_err(|err| Error::new(ErrorKind::Other, format!("{err:?}")))?;

    casbin_service
        .write()
        .await
        .get_role_manager()
        .write()
        .matching_fn(Some(key_match2), None);

    tracing::info!(model_path, policy_path, "access control loaded");
    Ok(casbin_service)
}
