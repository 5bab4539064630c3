//! Map type
use super::*;
use crate::error::UnknownCommandError;

/// Map from command names to built-in commands.
#[derive(Debug, Clone)]
pub struct Map {
    built_ins: HashMap<String, BuiltIn>,
}

impl Default for Map {
    fn default() -> Self {
        Map::new(built_ins())
    }
}

impl Map {
    pub fn new<I, S>(built_ins: I) -> Map
    where
        I: IntoIterator<Item = (S, BuiltIn)>,
        S: Into<String>,
    {
        Map {
            built_ins: built_ins
                .into_iter()
                .map(|(name, built_in)| (name.into(), built_in))
                .collect(),
        }
    }

    /// Adds a command under a name, replacing any command with that name.
    pub fn insert<S: Into<String>>(&mut self, name: S, built_in: BuiltIn) {
        self.built_ins.insert(name.into(), built_in);
    }

    pub fn get(&self, name: &str) -> Option<&BuiltIn> {
        self.built_ins.get(name)
    }

    /// Returns the kind of the named command, or an unknown command error.
    pub fn kind(&self, name: &str) -> psalter::Result<Kind> {
        match self.built_ins.get(name) {
            Some(built_in) => Ok(built_in.kind),
            None => Err(UnknownCommandError {
                name: name.to_string(),
                close_names: self.close_names(name),
            }
            .into()),
        }
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.built_ins.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn is_empty(&self) -> bool {
        self.built_ins.is_empty()
    }

    pub fn len(&self) -> usize {
        self.built_ins.len()
    }

    /// Registered names within a small edit distance of the name, closest first.
    fn close_names(&self, name: &str) -> Vec<String> {
        let max_distance = std::cmp::max(2, name.chars().count() / 3);
        let mut candidates: Vec<(usize, &str)> = self
            .names()
            .into_iter()
            .map(|candidate| (levenshtein_distance(name, candidate), candidate))
            .filter(|(distance, _)| *distance <= max_distance)
            .collect();
        candidates.sort();
        candidates
            .into_iter()
            .map(|(_, candidate)| candidate.to_string())
            .collect()
    }
}

fn levenshtein_distance(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    // previous[j] is the distance between a[..i] and b[..j].
    let mut previous: Vec<usize> = (0..=b.len()).collect();
    let mut current = vec![0; b.len() + 1];
    for (i, a_i) in a.iter().enumerate() {
        current[0] = i + 1;
        for (j, b_j) in b.iter().enumerate() {
            current[j + 1] = if a_i == b_j {
                previous[j]
            } else {
                1 + previous[j].min(previous[j + 1]).min(current[j])
            };
        }
        std::mem::swap(&mut previous, &mut current);
    }
    previous[b.len()]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Kind as ErrorKind;

    #[test]
    fn distance() {
        assert_eq!(levenshtein_distance("", ""), 0);
        assert_eq!(levenshtein_distance("def", "def"), 0);
        assert_eq!(levenshtein_distance("dfe", "def"), 2);
        assert_eq!(levenshtein_distance("kitten", "sitting"), 3);
        assert_eq!(levenshtein_distance("", "abc"), 3);
    }

    #[test]
    fn unknown_command_suggests_close_name() {
        let map = Map::default();
        let err = map.kind("footnot").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnknownCommand);
        let s = format!["{err}"];
        assert!(s.contains("footnote"), "{s}");
    }

    #[test]
    fn lookup_built_in() {
        let map = Map::default();
        assert_eq!(map.kind("trslit").unwrap(), Kind::Transliterate);
        assert!(map.names().contains(&"lines"));
    }
}
