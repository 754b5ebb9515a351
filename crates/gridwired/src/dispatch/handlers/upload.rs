use std::fs;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use serde_json::json;
use tracing::{info, warn};

use super::string_param;
use crate::dispatch::DISPATCH_TARGET;
use crate::dispatch::envelope::{Params, Reply, Status};
use crate::network::{NetworkService, store};

/// `upload_iidm`: stores a base64-encoded network file and loads it.
pub(crate) fn upload_iidm(service: &mut dyn NetworkService, params: &Params) -> Reply {
    let (Some(encoded), Some(filename)) = (
        string_param(params, "file_data"),
        string_param(params, "filename"),
    ) else {
        return Reply::error(Status::BAD_REQUEST, "File data and filename are required");
    };

    let bytes = match STANDARD.decode(encoded) {
        Ok(bytes) => bytes,
        Err(error) => return upload_failure(&error),
    };

    let path = match store::write_upload(service.upload_folder(), filename, &bytes) {
        Ok(path) => path,
        Err(error) => return upload_failure(&error),
    };
    info!(
        target: DISPATCH_TARGET,
        path = %path,
        filename,
        "upload stored, processing"
    );

    if let Err(error) = service.process_iidm_file(&path) {
        if let Err(remove_error) = fs::remove_file(&path) {
            warn!(
                target: DISPATCH_TARGET,
                path = %path,
                error = %remove_error,
                "failed to delete rejected upload"
            );
        }
        return Reply::error(
            Status::BAD_REQUEST,
            format!("Error during processing: {error}"),
        );
    }

    service.prune_stored_networks();
    Reply::new(
        Status::CREATED,
        json!({ "status": "IIDM file loaded", "file_path": path }),
    )
}

fn upload_failure(error: &dyn std::error::Error) -> Reply {
    warn!(target: DISPATCH_TARGET, error = %error, "upload failed");
    Reply::error(
        Status::INTERNAL_SERVER_ERROR,
        format!("Error during upload: {error}"),
    )
}
