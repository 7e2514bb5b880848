use std::collections::HashMap;
use std::hash::Hash;

const LARGE_PREFIXES: [char; 10] = ['k', 'M', 'G', 'T', 'P', 'E', 'Z', 'Y', 'R', 'Q'];
const SMALL_PREFIXES: [char; 10] = ['m', 'µ', 'n', 'p', 'f', 'a', 'z', 'y', 'r', 'q'];

/// Format a number with SI prefixes (`1.5 k`), or binary prefixes (`1.5 Ki`)
/// scaled by 1024 when `binary` is set. At most `digits` decimals are shown.
pub fn human_readable(number: f64, binary: bool, digits: usize) -> String {
    if number == 0.0 || !number.is_finite() {
        return if number == 0.0 { "0".to_string() } else { number.to_string() };
    }
    let sign = if number < 0.0 { "-" } else { "" };
    let number = number.abs();

    let (log, base) = if binary {
        (number.log2() / 10.0, 1024f64)
    } else {
        (number.log10() / 3.0, 1000f64)
    };
    let scale = (log.floor() as i32).clamp(-10, 10);
    let scaled = number / base.powi(scale);

    let units = match scale {
        0 => String::new(),
        s if s > 0 => {
            let prefix = if binary && s == 1 { 'K' } else { LARGE_PREFIXES[s as usize - 1] };
            format!(" {prefix}{}", if binary { "i" } else { "" })
        }
        s => {
            let prefix = SMALL_PREFIXES[(-s) as usize - 1];
            format!(" {prefix}{}", if binary { "i" } else { "" })
        }
    };

    let mut text = format!("{scaled:.digits$}");
    if text.contains('.') {
        text = text.trim_end_matches('0').trim_end_matches('.').to_string();
    }
    format!("{sign}{text}{units}")
}

/// Assigns dense indices `0..n` to distinct keys in first-seen order.
#[derive(Debug, Clone)]
pub struct Indexer<K> {
    indices: HashMap<K, usize>,
}

impl<K> Default for Indexer<K> {
    fn default() -> Self {
        Self {
            indices: HashMap::new(),
        }
    }
}

impl<K: Hash + Eq> Indexer<K> {
    pub fn new() -> Self {
        Self::default()
    }

    /// The index of `key`, assigning the next free one if it is new.
    pub fn index(&mut self, key: K) -> usize {
        let next = self.indices.len();
        *self.indices.entry(key).or_insert(next)
    }

    pub fn get(&self, key: &K) -> Option<usize> {
        self.indices.get(key).copied()
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }
}
