#![forbid(unsafe_code)]

use std::fmt;

const PERMISSION_MASK: u32 = 0o777;

// Bit, character, in `ls -l` column order.
const SYMBOLS: [(u32, char); 9] = [
    (0o400, 'r'),
    (0o200, 'w'),
    (0o100, 'x'),
    (0o040, 'r'),
    (0o020, 'w'),
    (0o010, 'x'),
    (0o004, 'r'),
    (0o002, 'w'),
    (0o001, 'x'),
];

/// The nine rwx bits for owner, group and other. Setuid, setgid, sticky and
/// file-type bits are dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Permissions(u32);

impl Permissions {
    pub const NONE: Self = Self(0);

    pub fn from_mode(mode: u32) -> Self {
        Self(mode & PERMISSION_MASK)
    }

    pub fn bits(self) -> u32 {
        self.0
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// `ls -l` style string with a leading type character, e.g. `drwxr-x---`.
    pub fn render(self, is_directory: bool) -> String {
        let mut out = String::with_capacity(10);
        out.push(if is_directory { 'd' } else { '-' });
        out.push_str(&self.to_string());
        out
    }

    /// Inverse of [`Permissions::render`]. Returns the bits and whether the
    /// type character marks a directory.
    pub fn parse(text: &str) -> Option<(Self, bool)> {
        let mut chars = text.chars();
        let is_directory = match chars.next()? {
            'd' => true,
            '-' => false,
            _ => return None,
        };
        let mut bits = 0;
        for &(bit, symbol) in &SYMBOLS {
            match chars.next()? {
                c if c == symbol => bits |= bit,
                '-' => {}
                _ => return None,
            }
        }
        if chars.next().is_some() {
            return None;
        }
        Some((Self(bits), is_directory))
    }
}

impl fmt::Display for Permissions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for &(bit, symbol) in &SYMBOLS {
            let c = if self.0 & bit != 0 { symbol } else { '-' };
            fmt::Write::write_char(f, c)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn renders_like_ls() {
        assert_eq!(Permissions::from_mode(0o100644).render(false), "-rw-r--r--");
        assert_eq!(Permissions::from_mode(0o040750).render(true), "drwxr-x---");
        assert_eq!(Permissions::NONE.render(false), "----------");
    }

    #[test]
    fn rejects_malformed_strings() {
        assert_eq!(Permissions::parse("lrwxrwxrwx"), None);
        assert_eq!(Permissions::parse("-rw-r--r"), None);
        assert_eq!(Permissions::parse("-rw-r--r--x"), None);
        assert_eq!(Permissions::parse("-wr-r--r--"), None);
    }

    proptest! {
        #[test]
        fn special_and_type_bits_never_count(mode in any::<u32>()) {
            let permissions = Permissions::from_mode(mode);
            prop_assert_eq!(permissions.is_empty(), mode & 0o777 == 0);
            prop_assert!(permissions.bits() <= 0o777);
        }

        #[test]
        fn parse_reads_back_rendered_bits(mode in 0u32..=0o777, is_dir in any::<bool>()) {
            let permissions = Permissions::from_mode(mode);
            prop_assert_eq!(
                Permissions::parse(&permissions.render(is_dir)),
                Some((permissions, is_dir))
            );
        }
    }
}
