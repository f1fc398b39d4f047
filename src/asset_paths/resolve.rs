/// Resolve a raw source reference against the resource root and the type sub-directory.
///
/// Absolute references (leading `/`) are returned untouched. Anything else is treated as
/// relative to `{resource_root}/{type_subpath}`. No validation happens here: a malformed
/// reference simply produces a path that fails later, when the compiler tries to read it.
pub fn resolve_resource_path(resource_root: &str, type_subpath: &str, raw: &str) -> String {
    if raw.starts_with('/') {
        return raw.to_string();
    }

    format!("{resource_root}/{type_subpath}/{raw}")
}
