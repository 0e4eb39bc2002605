use lasso::{Key, Rodeo};

/// Hands out short target names from a single monotonic counter.
///
/// Names are the bijective base-26 spelling of the counter (`a`..`z`, `aa`, ...),
/// so two different counter values never produce the same name.
#[derive(Debug, Default)]
pub struct NameGenerator {
    issued: u64,
}

impl NameGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next_name(&mut self) -> Box<str> {
        self.issued += 1;
        encode(self.issued)
    }

    /// How many names have been handed out so far.
    pub fn issued(&self) -> u64 {
        self.issued
    }
}

/// Bijective base-26: 1 -> `a`, 26 -> `z`, 27 -> `aa`.
pub fn encode(mut value: u64) -> Box<str> {
    debug_assert!(value > 0);
    let mut letters = Vec::new();
    while value > 0 {
        value -= 1;
        letters.push(b'a' + (value % 26) as u8);
        value /= 26;
    }
    letters.reverse();
    letters
        .into_iter()
        .map(char::from)
        .collect::<String>()
        .into_boxed_str()
}

/// Maps source identifiers to generated short names.
///
/// Entries are never removed. Keys handed out by the interner are dense, so the
/// short name for a key lives at the key's index.
#[derive(Debug, Default)]
pub struct NameTable {
    interner: Rodeo,
    short: Vec<Box<str>>,
}

impl NameTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Short name for `name`, allocating one on first sight.
    pub fn resolve(&mut self, name: &str, names: &mut NameGenerator) -> &str {
        self.create(name, names).0
    }

    /// Like [`Self::resolve`] but also reports whether the name already existed.
    pub fn create(&mut self, name: &str, names: &mut NameGenerator) -> (&str, bool) {
        let key = self.interner.get_or_intern(name);
        let index = key.into_usize();
        let existed = index < self.short.len();
        if !existed {
            self.short.push(names.next_name());
        }
        (&self.short[index], existed)
    }

    /// Short name for `name` if it was ever resolved or created.
    pub fn lookup(&self, name: &str) -> Option<&str> {
        let key = self.interner.get(name)?;
        self.short.get(key.into_usize()).map(AsRef::as_ref)
    }

    pub fn len(&self) -> usize {
        self.short.len()
    }

    pub fn is_empty(&self) -> bool {
        self.short.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::{encode, NameGenerator, NameTable};
    use arbtest::arbtest;
    use assert2::check;

    #[test]
    fn encoding() {
        check!(&*encode(1) == "a");
        check!(&*encode(26) == "z");
        check!(&*encode(27) == "aa");
        check!(&*encode(52) == "az");
        check!(&*encode(53) == "ba");
        check!(&*encode(702) == "zz");
        check!(&*encode(703) == "aaa");
    }

    #[test]
    fn encoding_is_injective() {
        let names = (1..=20_000).map(encode).collect::<HashSet<_>>();
        check!(names.len() == 20_000);
    }

    #[test]
    fn resolve_is_stable() {
        let mut names = NameGenerator::new();
        let mut table = NameTable::new();

        let first = table.resolve("test", &mut names).to_owned();
        let other = table.resolve("other", &mut names).to_owned();
        check!(first == "a");
        check!(other == "b");
        check!(table.resolve("test", &mut names) == "a");
        check!(names.issued() == 2);
        check!(table.len() == 2);
    }

    #[test]
    fn create_reports_existing() {
        let mut names = NameGenerator::new();
        let mut table = NameTable::new();

        check!(table.create("store", &mut names) == ("a", false));
        check!(table.create("store", &mut names) == ("a", true));
        check!(table.lookup("store") == Some("a"));
        check!(table.lookup("missing") == None);
    }

    #[test]
    fn tables_share_the_counter_but_not_the_namespace() {
        let mut names = NameGenerator::new();
        let mut variables = NameTable::new();
        let mut stores = NameTable::new();

        let variable = variables.resolve("x", &mut names).to_owned();
        let store = stores.resolve("x", &mut names).to_owned();
        check!(variable != store);
        check!(stores.lookup("x") == Some(store.as_str()));
    }

    #[test]
    fn resolve_is_injective() {
        arbtest(|u| {
            let sources: Vec<String> = u.arbitrary()?;
            let mut names = NameGenerator::new();
            let mut table = NameTable::new();

            let resolved = sources
                .iter()
                .map(|source| table.resolve(source, &mut names).to_owned())
                .collect::<Vec<_>>();

            for (i, a) in sources.iter().enumerate() {
                for (j, b) in sources.iter().enumerate() {
                    check!((a == b) == (resolved[i] == resolved[j]), "{a:?} and {b:?}");
                }
            }
            Ok(())
        });
    }
}
