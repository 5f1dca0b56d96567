use std::collections::HashMap;

/// Makes column names unique by appending `_2`, `_3`, ... to repeats.
pub fn dedupe_names<I, S>(names: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let names: Vec<String> = names.into_iter().map(Into::into).collect();
    let mut seen: HashMap<String, usize> = HashMap::new();
    let mut taken: Vec<String> = Vec::with_capacity(names.len());

    for name in names {
        let count = seen.entry(name.clone()).or_insert(0);
        *count += 1;
        let mut candidate = if *count == 1 {
            name.clone()
        } else {
            format!("{}_{}", name, count)
        };
        // a generated name may collide with a later literal one
        while taken.contains(&candidate) {
            *count += 1;
            candidate = format!("{}_{}", name, count);
        }
        taken.push(candidate);
    }
    taken
}
