pub const FILE: &str = "file";
pub const QRC: &str = "qrc";
pub const HTTP: &str = "http";
pub const HTTPS: &str = "https";

const BUNDLE_PREFIXES: [&str; 2] = ["qrc:/", ":/"];
const SCHEME_SEPARATOR: &str = "://";

#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct Location {
    pub protocol: String,
    pub path: String,
    pub suffix: String,
}

impl Location {
    pub fn parse(source: &str) -> Location {
        let protocol = protocol_of(source);
        let path = path_of(source).to_owned();
        let suffix = suffix_of(&path);

        Location {
            protocol: protocol.to_owned(),
            path,
            suffix,
        }
    }

    pub fn is_bundled(&self) -> bool {
        self.protocol == QRC
    }
}

pub fn protocol_of(source: &str) -> &str {
    if BUNDLE_PREFIXES.iter().any(|p| source.starts_with(p)) {
        return QRC;
    }

    match source.find(SCHEME_SEPARATOR) {
        Some(pos) => &source[..pos],
        None => FILE,
    }
}

pub fn path_of(source: &str) -> &str {
    for prefix in BUNDLE_PREFIXES {
        if let Some(rest) = source.strip_prefix(prefix) {
            return rest.trim_start_matches('/');
        }
    }

    match source.find(SCHEME_SEPARATOR) {
        Some(pos) => &source[pos + SCHEME_SEPARATOR.len()..],
        None => source,
    }
}

pub fn suffix_of(source: &str) -> String {
    let name = source.rsplit(['/', '\\']).next().unwrap_or(source);
    match name.rfind('.') {
        Some(pos) if pos + 1 < name.len() => name[pos + 1..].to_lowercase(),
        _ => String::new(),
    }
}
