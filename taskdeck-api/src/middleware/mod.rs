/// Middleware modules for the API server
///
/// - `headers`: JSON content-type normalization

pub mod headers;
