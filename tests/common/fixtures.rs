//! Archived page and asset fixtures

/// Capture time used for the fixture site
pub const CAPTURED: &str = "20190315083000";

/// Home page referencing local, cross-host, oddly named, missing and inline assets
pub const HOME_PAGE: &str = r#"<!DOCTYPE html>
<html>
<head>
  <title>Example</title>
  <link rel="stylesheet" href="/css/site.css">
  <link rel="icon" href="/favicon.ico">
  <script src="/js/app.js"></script>
  <script src="https://cdn.example.net/lib.js"></script>
</head>
<body>
  <a href="/about/">About</a>
  <img src="/img/a:b.png">
  <img src="/img/missing.png">
  <img src="data:image/gif;base64,R0lGODlhAQABAAAAACw=">
</body>
</html>"#;

/// Second page sharing the stylesheet
pub const ABOUT_PAGE: &str = r#"<html><head>
<link rel="stylesheet" href="/css/site.css#print">
</head><body><p>About us</p></body></html>"#;

/// Page served for a URL with a query string
pub const SEARCH_PAGE: &str = "<html><body><p>2 results</p></body></html>";

/// Stylesheet body
pub const SITE_CSS: &str = "body { font-family: serif; }";

/// Script bodies
pub const APP_JS: &str = "console.log('app');";
/// Third-party script body
pub const LIB_JS: &str = "window.lib = {};";

/// Smallest PNG signature plus a few bytes that are not valid UTF-8
pub fn png_bytes() -> Vec<u8> {
    vec![0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a, 0xff, 0xfe, 0x00, 0x01]
}
