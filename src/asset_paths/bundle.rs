use crate::models::AssetType;

/// Produce the output path of a compiled asset relative to the asset directory.
///
/// The generated path always uses forward slashes so that the resulting URL works on every
/// platform, regardless of the native directory separator.
pub fn make_target_path(asset_type: AssetType, file_name: &str) -> String {
    format!("{}/{}", asset_type.tag(), file_name).replace('\\', "/")
}
