//! Namespace URIs used by Android manifests

/// `android:` attributes
pub const ANDROID_URI: &str = "http://schemas.android.com/apk/res/android";

/// `tools:` merger directives
pub const TOOLS_URI: &str = "http://schemas.android.com/tools";

/// Namespace of `xmlns` / `xmlns:*` declarations
pub const XMLNS_URI: &str = "http://www.w3.org/2000/xmlns/";

/// Namespace bound to the reserved `xml:` prefix
pub const XML_URI: &str = "http://www.w3.org/XML/1998/namespace";

/// Conventional prefix for [`ANDROID_URI`]
pub const ANDROID_PREFIX: &str = "android";

/// Conventional prefix for [`TOOLS_URI`]
pub const TOOLS_PREFIX: &str = "tools";
