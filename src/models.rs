/// A movie known by name. Identity is the exact name: two movies are the
/// same entry if and only if their names match case-sensitively, which is
/// also how the autodl file records them.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Movie {
    pub name: String,
}

impl Movie {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl std::fmt::Display for Movie {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name)
    }
}
