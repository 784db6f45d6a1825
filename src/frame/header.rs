use std::collections::HashSet;

/// Prefix given to columns whose header cell is blank.
pub const UNNAMED_PREFIX: &str = "Unnamed: ";

/// Name blank header cells `Unnamed: <position>` and mangle repeats so every
/// column name is unique: `a`, `a.1`, `a.2`, ... Other names are kept exactly
/// as written, surrounding whitespace included.
pub fn normalize_headers<I, S>(raw: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let named: Vec<String> = raw
        .into_iter()
        .enumerate()
        .map(|(pos, h)| {
            let h = h.as_ref();
            if h.trim().is_empty() {
                format!("{}{}", UNNAMED_PREFIX, pos)
            } else {
                h.to_string()
            }
        })
        .collect();

    let mut taken: HashSet<String> = HashSet::with_capacity(named.len());
    let mut out = Vec::with_capacity(named.len());
    for name in named {
        if taken.insert(name.clone()) {
            out.push(name);
            continue;
        }
        let mut n = 1usize;
        let mangled = loop {
            let candidate = format!("{}.{}", name, n);
            if !taken.contains(&candidate) {
                break candidate;
            }
            n += 1;
        };
        taken.insert(mangled.clone());
        out.push(mangled);
    }
    out
}
