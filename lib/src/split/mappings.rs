use super::{Error, NameOracle};
use crate::jvm::BinaryName;
use std::collections::HashMap;
use std::path::Path;

/// Class name mappings, as read from a mapping file
///
/// Only class lines matter here: member mappings are skipped. Names map from the first column of
/// the file to the second, so use [`ClassMappings::reversed`] when the file is written in the
/// other direction from what the oracle needs.
///
/// Recognized formats are SRG (`CL: a b`), TSRG and TSRG2, tiny v1 and v2, and ProGuard
/// (`a.b.C -> x:`).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClassMappings {
    names: HashMap<BinaryName, BinaryName>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Format {
    Srg,
    Tsrg,
    Tsrg2,
    TinyV1,
    TinyV2,
    Proguard,
}

impl Format {
    fn detect(first_line: &str) -> Format {
        if first_line.starts_with("tiny\t2") {
            Format::TinyV2
        } else if first_line.starts_with("v1\t") {
            Format::TinyV1
        } else if first_line.starts_with("tsrg2 ") {
            Format::Tsrg2
        } else if ["PK: ", "CL: ", "FD: ", "MD: "]
            .iter()
            .any(|prefix| first_line.starts_with(prefix))
        {
            Format::Srg
        } else if first_line.contains(" -> ") {
            Format::Proguard
        } else {
            Format::Tsrg
        }
    }

    /// Whether the first line is a header rather than a mapping
    fn has_header(self) -> bool {
        matches!(self, Format::Tsrg2 | Format::TinyV1 | Format::TinyV2)
    }
}

impl ClassMappings {
    pub fn new() -> ClassMappings {
        ClassMappings::default()
    }

    pub fn insert(&mut self, from: BinaryName, to: BinaryName) {
        self.names.insert(from, to);
    }

    pub fn get(&self, name: &BinaryName) -> Option<&BinaryName> {
        self.names.get(name)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Same mappings in the opposite direction
    pub fn reversed(&self) -> ClassMappings {
        ClassMappings {
            names: self
                .names
                .iter()
                .map(|(from, to)| (to.clone(), from.clone()))
                .collect(),
        }
    }

    pub fn load(path: impl AsRef<Path>) -> Result<ClassMappings, Error> {
        let path = path.as_ref();
        let mappings = ClassMappings::parse(&std::fs::read_to_string(path)?)?;
        log::info!("Loaded {} class mappings from {}", mappings.len(), path.display());
        Ok(mappings)
    }

    pub fn parse(text: &str) -> Result<ClassMappings, Error> {
        let mut mappings = ClassMappings::new();
        let mut lines = text
            .lines()
            .enumerate()
            .map(|(idx, line)| (idx + 1, line.trim_end_matches('\r')))
            .filter(|(_, line)| !line.trim().is_empty() && !line.starts_with('#'))
            .peekable();

        let format = match lines.peek() {
            None => return Ok(mappings),
            Some((_, first)) => Format::detect(first),
        };
        if format.has_header() {
            lines.next();
        }
        log::debug!("Reading class mappings as {:?}", format);

        for (number, line) in lines {
            // Members are indented under their class in every format but SRG
            if line.starts_with(char::is_whitespace) {
                continue;
            }
            if let Some((from, to)) = class_line(format, line, number)? {
                mappings.insert(binary_name(from, number)?, binary_name(to, number)?);
            }
        }
        Ok(mappings)
    }
}

fn class_line(
    format: Format,
    line: &str,
    number: usize,
) -> Result<Option<(String, String)>, Error> {
    let columns: Vec<&str> = match format {
        Format::Srg => match line.strip_prefix("CL: ") {
            Some(rest) => rest.split_whitespace().collect(),
            None => return Ok(None),
        },
        Format::TinyV1 => match line.strip_prefix("CLASS\t") {
            Some(rest) => rest.split('\t').collect(),
            None => return Ok(None),
        },
        Format::TinyV2 => match line.strip_prefix("c\t") {
            Some(rest) => rest.split('\t').collect(),
            None => return Ok(None),
        },
        Format::Tsrg | Format::Tsrg2 => {
            let columns: Vec<&str> = line.split_whitespace().collect();
            // Package mappings (`a/ b/`)
            if columns.first().map_or(false, |column| column.ends_with('/')) {
                return Ok(None);
            }
            columns
        }
        Format::Proguard => {
            let (from, to) = line
                .strip_suffix(':')
                .and_then(|line| line.split_once(" -> "))
                .ok_or_else(|| mappings_error(number, "expected `name -> name:`"))?;
            return Ok(Some((from.trim().replace('.', "/"), to.trim().replace('.', "/"))));
        }
    };

    match columns[..] {
        [from, to, ..] => Ok(Some((from.to_owned(), to.to_owned()))),
        _ => Err(mappings_error(number, "expected at least two names")),
    }
}

fn binary_name(name: String, number: usize) -> Result<BinaryName, Error> {
    BinaryName::from_string(name).map_err(|message| mappings_error(number, &message))
}

fn mappings_error(line: usize, message: &str) -> Error {
    Error::Mappings {
        line,
        message: message.to_owned(),
    }
}

impl NameOracle for ClassMappings {
    fn original_name(&self, name: &BinaryName) -> Option<BinaryName> {
        self.get(name).cloned()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn name(name: &str) -> BinaryName {
        BinaryName::from_string(name.to_owned()).unwrap()
    }

    fn pairs(mappings: &ClassMappings) -> Vec<(String, String)> {
        let mut pairs: Vec<(String, String)> = mappings
            .names
            .iter()
            .map(|(from, to)| (from.to_string(), to.to_string()))
            .collect();
        pairs.sort();
        pairs
    }

    fn expected(list: &[(&str, &str)]) -> Vec<(String, String)> {
        list.iter()
            .map(|(from, to)| (from.to_string(), to.to_string()))
            .collect()
    }

    #[test]
    fn srg() {
        let text = "PK: . net/minecraft/src\n\
                    CL: afd net/minecraft/world/World\n\
                    FD: afd/a net/minecraft/world/World/field_1\n\
                    CL: afd$1 net/minecraft/world/World$1\n";
        let mappings = ClassMappings::parse(text).unwrap();
        assert_eq!(
            pairs(&mappings),
            expected(&[
                ("afd", "net/minecraft/world/World"),
                ("afd$1", "net/minecraft/world/World$1"),
            ])
        );
    }

    #[test]
    fn tsrg_skips_members_and_packages() {
        let text = "a/ net/minecraft/\n\
                    afd net/minecraft/world/World\n\
                    \ta field_1\n\
                    \tb ()V func_2\n\
                    ejb net/minecraft/client/Minecraft\n";
        let mappings = ClassMappings::parse(text).unwrap();
        assert_eq!(mappings.len(), 2);
        assert_eq!(
            mappings.original_name(&name("ejb")),
            Some(name("net/minecraft/client/Minecraft"))
        );
    }

    #[test]
    fn tsrg2_and_tiny() {
        let tsrg2 = "tsrg2 obf srg id\nafd net/minecraft/world/World 1234\n\ta f_1 1\n";
        assert_eq!(
            pairs(&ClassMappings::parse(tsrg2).unwrap()),
            expected(&[("afd", "net/minecraft/world/World")])
        );

        let tiny = "tiny\t2\t0\tofficial\tintermediary\n\
                    c\tafd\tnet/minecraft/class_1937\n\
                    \tf\tI\ta\tfield_1\n";
        assert_eq!(
            pairs(&ClassMappings::parse(tiny).unwrap()),
            expected(&[("afd", "net/minecraft/class_1937")])
        );

        let tiny_v1 = "v1\tofficial\tintermediary\n\
                       CLASS\tafd\tnet/minecraft/class_1937\n\
                       FIELD\tafd\tI\ta\tfield_1\n";
        assert_eq!(
            pairs(&ClassMappings::parse(tiny_v1).unwrap()),
            expected(&[("afd", "net/minecraft/class_1937")])
        );
    }

    #[test]
    fn proguard_uses_dots() {
        let text = "# compiler: R8\n\
                    net.minecraft.world.level.Level -> afd:\n    \
                    int field -> a\n\
                    net.minecraft.client.Minecraft$1 -> ejb$1:\n";
        let mappings = ClassMappings::parse(text).unwrap().reversed();
        assert_eq!(
            pairs(&mappings),
            expected(&[
                ("afd", "net/minecraft/world/level/Level"),
                ("ejb$1", "net/minecraft/client/Minecraft$1"),
            ])
        );
    }

    #[test]
    fn malformed_line_reports_its_number() {
        let text = "CL: afd net/minecraft/world/World\n\nCL: broken\n";
        match ClassMappings::parse(text) {
            Err(Error::Mappings { line, .. }) => assert_eq!(line, 3),
            other => panic!("unexpected result: {:?}", other),
        }
    }
}
