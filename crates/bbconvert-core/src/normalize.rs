use std::collections::HashSet;
use std::path::Path;

/// Lowercases and maps every character outside `[a-z0-9_.]` to `_`.
pub fn to_pack_name(raw: &str) -> String {
    raw.to_lowercase()
        .chars()
        .map(|c| match c {
            'a'..='z' | '0'..='9' | '_' | '.' => c,
            _ => '_',
        })
        .collect()
}

/// File-name stem for a texture: declared name without extension, or
/// `texture_<index>` when blank, optionally prefixed with the model name.
pub fn texture_stem(name: &str, index: usize, prefix: Option<&str>) -> String {
    let fallback = || format!("texture_{index}");
    let raw = if name.is_empty() { fallback() } else { name.to_string() };
    let stem = Path::new(&raw)
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(fallback);

    let mut stem = to_pack_name(&stem);
    if let Some(model_name) = prefix {
        stem = to_pack_name(&format!("{model_name}_{stem}"));
    }
    if stem.is_empty() {
        stem = fallback();
    }
    stem
}

/// Stems already handed out during one resolver pass.
#[derive(Debug, Clone, Default)]
pub struct StemRegistry {
    used: HashSet<String>,
}

impl StemRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `stem`, or `stem_2`, `stem_3`, ... whichever is free first,
    /// and marks it used.
    pub fn claim(&mut self, stem: &str) -> String {
        let mut candidate = stem.to_string();
        let mut suffix = 2u32;
        while self.used.contains(&candidate) {
            candidate = format!("{stem}_{suffix}");
            suffix += 1;
        }
        self.used.insert(candidate.clone());
        candidate
    }

    pub fn len(&self) -> usize {
        self.used.len()
    }

    pub fn is_empty(&self) -> bool {
        self.used.is_empty()
    }
}
