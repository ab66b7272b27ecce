mod attr;
pub use attr::*;

use crate::error::{GtfkitError, Result};
use std::borrow::Cow;
use std::str::FromStr;

/// Placeholder written for unset values.
pub const NA: &str = ".";

#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
pub enum Strand {
    Forward,
    Reverse,
    Unknown,
}

impl Strand {
    /// Parses GTF column 7; anything but `+`/`-` is unstranded.
    pub fn from_char(c: char) -> Self {
        match c {
            '+' => Strand::Forward,
            '-' => Strand::Reverse,
            _ => Strand::Unknown,
        }
    }

    pub fn as_char(self) -> char {
        match self {
            Strand::Forward => '+',
            Strand::Reverse => '-',
            Strand::Unknown => '.',
        }
    }

    pub fn is_known(self) -> bool {
        !matches!(self, Strand::Unknown)
    }
}

impl FromStr for Strand {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(s.chars().next().map_or(Strand::Unknown, Strand::from_char))
    }
}

impl std::fmt::Display for Strand {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Strand::Forward => write!(f, "+"),
            Strand::Reverse => write!(f, "-"),
            Strand::Unknown => write!(f, "."),
        }
    }
}

/// What to do when a requested key is neither a structural field nor an
/// attribute of the record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OnMissing {
    /// Yield `None` (lookups) or do nothing (updates).
    #[default]
    Continue,
    /// Fail with [`GtfkitError::MissingAttribute`].
    Raise,
    /// Yield / insert the `"."` placeholder.
    SetNa,
}

/// Outcome of resolving a single key against a record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lookup<'a> {
    Found(Cow<'a, str>),
    NotFound,
    Invalid,
}

/// Serialization switches passed explicitly to the formatters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FormatOptions {
    /// Prefix chromosome names with `chr` on output.
    pub add_chr: bool,
}

impl FormatOptions {
    fn chrom<'a>(&self, chrom: &'a str) -> Cow<'a, str> {
        if self.add_chr {
            Cow::Owned(format!("chr{chrom}"))
        } else {
            Cow::Borrowed(chrom)
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BedVariant {
    Bed3,
    Bed6,
}

impl FromStr for BedVariant {
    type Err = GtfkitError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "bed3" => Ok(BedVariant::Bed3),
            "bed6" | "bed" => Ok(BedVariant::Bed6),
            _ => Err(GtfkitError::UnsupportedFormat(format!("bed variant {s:?}"))),
        }
    }
}

/// The eight positional GTF columns addressable by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Chrom,
    Source,
    FeatureType,
    Start,
    End,
    Score,
    Strand,
    Frame,
}

impl Field {
    fn from_alias(key: &str) -> Option<Self> {
        match key {
            "chrom" | "seqname" | "seqid" => Some(Field::Chrom),
            "feature" | "ft_type" => Some(Field::FeatureType),
            "start" => Some(Field::Start),
            "end" => Some(Field::End),
            "src" | "source" => Some(Field::Source),
            "score" => Some(Field::Score),
            "strand" => Some(Field::Strand),
            "frame" => Some(Field::Frame),
            _ => None,
        }
    }
}

/// One GTF line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeatureRecord {
    pub chrom: String,
    pub source: String,
    pub feature_type: String,
    pub start: u64,
    pub end: u64,
    pub score: String,
    pub strand: Strand,
    pub frame: String,
    pub attributes: AttributeStore,
}

fn parse_coordinate(name: &str, value: &str) -> Result<u64> {
    value
        .trim()
        .parse::<u64>()
        .map_err(|_| GtfkitError::InvalidCoordinate(format!("{name} {value:?} is not an integer")))
}

fn check_bounds(start: u64, end: u64) -> Result<()> {
    if start == 0 {
        return Err(GtfkitError::InvalidCoordinate(
            "start must be 1-based (>= 1)".to_string(),
        ));
    }
    if start > end {
        return Err(GtfkitError::InvalidCoordinate(format!(
            "start {start} is greater than end {end}"
        )));
    }
    Ok(())
}

impl FeatureRecord {
    /// Builds a record from the eight positional columns, already split.
    ///
    /// # Example
    ///
    /// ```rust, ignore
    /// let attrs = AttributeStore::parse("gene_id \"g1\"; transcript_id \"g1t1\";")?;
    /// let rec = FeatureRecord::from_fields(
    ///     ["chr1", "src", "transcript", "100", "200", ".", "+", "."],
    ///     attrs,
    /// )?;
    /// assert_eq!(rec.five_prime_end()?, 100);
    /// ```
    pub fn from_fields(fields: [&str; 8], attributes: AttributeStore) -> Result<Self> {
        let [chrom, source, feature_type, start, end, score, strand, frame] = fields;

        let start = parse_coordinate("start", start)?;
        let end = parse_coordinate("end", end)?;
        check_bounds(start, end)?;

        Ok(Self {
            chrom: chrom.to_string(),
            source: source.to_string(),
            feature_type: feature_type.to_string(),
            start,
            end,
            score: score.to_string(),
            strand: strand.parse().unwrap_or(Strand::Unknown),
            frame: frame.to_string(),
            attributes,
        })
    }

    pub fn transcript_id(&self) -> Option<&str> {
        self.attributes.get("transcript_id")
    }

    pub fn gene_id(&self) -> Option<&str> {
        self.attributes.get("gene_id")
    }

    pub fn attr_names(&self) -> impl Iterator<Item = &str> {
        self.attributes.keys()
    }

    fn field_value(&self, field: Field) -> Cow<'_, str> {
        match field {
            Field::Chrom => Cow::Borrowed(&self.chrom),
            Field::Source => Cow::Borrowed(&self.source),
            Field::FeatureType => Cow::Borrowed(&self.feature_type),
            Field::Start => Cow::Owned(self.start.to_string()),
            Field::End => Cow::Owned(self.end.to_string()),
            Field::Score => Cow::Borrowed(&self.score),
            Field::Strand => Cow::Owned(self.strand.to_string()),
            Field::Frame => Cow::Borrowed(&self.frame),
        }
    }

    /// Resolves one key: structural aliases first, then attributes.
    pub fn lookup(&self, key: &str) -> Lookup<'_> {
        if key.is_empty() {
            return Lookup::Invalid;
        }

        match Field::from_alias(key) {
            Some(field) => Lookup::Found(self.field_value(field)),
            None => self
                .attributes
                .get(key)
                .map_or(Lookup::NotFound, |v| Lookup::Found(Cow::Borrowed(v))),
        }
    }

    /// Resolves each key in order, applying `on_missing` to unknown keys.
    pub fn get<S: AsRef<str>>(&self, keys: &[S], on_missing: OnMissing) -> Result<Vec<Option<String>>> {
        let mut values = Vec::with_capacity(keys.len());

        for key in keys {
            let key = key.as_ref();
            let value = match self.lookup(key) {
                Lookup::Found(value) => Some(value.into_owned()),
                Lookup::Invalid => return Err(GtfkitError::InvalidKey(key.to_string())),
                Lookup::NotFound => match on_missing {
                    OnMissing::Continue => None,
                    OnMissing::Raise => return Err(GtfkitError::MissingAttribute(key.to_string())),
                    OnMissing::SetNa => Some(NA.to_string()),
                },
            };
            values.push(value);
        }

        Ok(values)
    }

    /// Updates a structural field or an existing attribute.
    ///
    /// Unknown keys follow `on_missing`; under `Raise` the record is left
    /// untouched.
    pub fn set(&mut self, key: &str, value: &str, on_missing: OnMissing) -> Result<()> {
        if key.is_empty() {
            return Err(GtfkitError::InvalidKey(key.to_string()));
        }

        if let Some(field) = Field::from_alias(key) {
            return self.set_field(field, value);
        }

        if self.attributes.contains_key(key) {
            self.attributes.insert(key, value);
            return Ok(());
        }

        match on_missing {
            OnMissing::Continue => Ok(()),
            OnMissing::SetNa => {
                self.attributes.insert(key, NA);
                Ok(())
            }
            OnMissing::Raise => Err(GtfkitError::MissingAttribute(key.to_string())),
        }
    }

    fn set_field(&mut self, field: Field, value: &str) -> Result<()> {
        match field {
            Field::Chrom => self.chrom = value.to_string(),
            Field::Source => self.source = value.to_string(),
            Field::FeatureType => self.feature_type = value.to_string(),
            Field::Start => {
                let start = parse_coordinate("start", value)?;
                check_bounds(start, self.end)?;
                self.start = start;
            }
            Field::End => {
                let end = parse_coordinate("end", value)?;
                check_bounds(self.start, end)?;
                self.end = end;
            }
            Field::Score => self.score = value.to_string(),
            Field::Strand => self.strand = value.parse().unwrap_or(Strand::Unknown),
            Field::Frame => self.frame = value.to_string(),
        }
        Ok(())
    }

    /// Unconditional attribute upsert.
    pub fn add_attr(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.attributes.insert(key, value);
    }

    /// 5' end, one-based.
    pub fn five_prime_end(&self) -> Result<u64> {
        match self.strand {
            Strand::Forward => Ok(self.start),
            Strand::Reverse => Ok(self.end),
            Strand::Unknown => Err(GtfkitError::StrandRequired(format!(
                "cannot retrieve 5' end of unstranded {} at {}:{}-{}",
                self.feature_type, self.chrom, self.start, self.end
            ))),
        }
    }

    /// 3' end, one-based.
    pub fn three_prime_end(&self) -> Result<u64> {
        match self.strand {
            Strand::Forward => Ok(self.end),
            Strand::Reverse => Ok(self.start),
            Strand::Unknown => Err(GtfkitError::StrandRequired(format!(
                "cannot retrieve 3' end of unstranded {} at {}:{}-{}",
                self.feature_type, self.chrom, self.start, self.end
            ))),
        }
    }

    fn structural_columns(&self, chrom: &str) -> [String; 8] {
        [
            chrom.to_string(),
            self.source.clone(),
            self.feature_type.clone(),
            self.start.to_string(),
            self.end.to_string(),
            self.score.clone(),
            self.strand.to_string(),
            self.frame.clone(),
        ]
    }

    /// Nine-column GTF line, without trailing newline.
    pub fn format_gtf(&self, options: &FormatOptions) -> String {
        let mut columns = Vec::from(self.structural_columns(&options.chrom(&self.chrom)));
        columns.push(self.attributes.to_string());
        columns.join("\t")
    }

    /// Structural columns followed by the resolved value of each name.
    pub fn format_tab<S: AsRef<str>>(&self, attr_names: &[S], sep: &str) -> String {
        let mut columns = Vec::from(self.structural_columns(&self.chrom));
        for name in attr_names {
            let value = match self.lookup(name.as_ref()) {
                Lookup::Found(value) => value.into_owned(),
                Lookup::NotFound | Lookup::Invalid => NA.to_string(),
            };
            columns.push(value);
        }
        columns.join(sep)
    }

    /// Zero-based half-open BED line.
    pub fn format_bed(
        &self,
        name: Option<&str>,
        variant: BedVariant,
        options: &FormatOptions,
    ) -> Result<String> {
        let mut columns = vec![
            options.chrom(&self.chrom).into_owned(),
            self.start.saturating_sub(1).to_string(),
            self.end.to_string(),
        ];

        if variant == BedVariant::Bed6 {
            let name = name.ok_or_else(|| {
                GtfkitError::MissingAttribute("name (column 4) is required for BED6".to_string())
            })?;
            columns.push(name.to_string());
            columns.push(self.score.clone());
            columns.push(self.strand.to_string());
        }

        Ok(columns.join("\t"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(strand: &str) -> FeatureRecord {
        let attrs = AttributeStore::parse("transcript_id \"g1t1\"; gene_id \"g1\";").unwrap();
        FeatureRecord::from_fields(
            ["chr1", "Unknown", "transcript", "100", "200", ".", strand, "."],
            attrs,
        )
        .unwrap()
    }

    #[test]
    fn test_from_fields() {
        let rec = record("+");
        assert_eq!(rec.chrom, "chr1");
        assert_eq!(rec.start, 100);
        assert_eq!(rec.end, 200);
        assert_eq!(rec.strand, Strand::Forward);
        assert_eq!(rec.transcript_id(), Some("g1t1"));
        assert_eq!(rec.gene_id(), Some("g1"));
        assert_eq!(rec.attr_names().collect::<Vec<_>>(), vec!["transcript_id", "gene_id"]);
    }

    #[test]
    fn test_from_fields_rejects_bad_coordinates() {
        let bad = [["chr1", "s", "exon", "200", "100", ".", "+", "."],
            ["chr1", "s", "exon", "0", "100", ".", "+", "."],
            ["chr1", "s", "exon", "x", "100", ".", "+", "."]];
        for fields in bad {
            assert!(matches!(
                FeatureRecord::from_fields(fields, AttributeStore::new()),
                Err(GtfkitError::InvalidCoordinate(_))
            ));
        }
    }

    #[test]
    fn test_prime_ends() {
        let fwd = record("+");
        assert_eq!(fwd.five_prime_end().unwrap(), 100);
        assert_eq!(fwd.three_prime_end().unwrap(), 200);

        let rev = record("-");
        assert_eq!(rev.five_prime_end().unwrap(), 200);
        assert_eq!(rev.three_prime_end().unwrap(), 100);

        let none = record(".");
        assert!(matches!(none.five_prime_end(), Err(GtfkitError::StrandRequired(_))));
        assert!(matches!(none.three_prime_end(), Err(GtfkitError::StrandRequired(_))));
    }

    #[test]
    fn test_get_aliases_and_policies() {
        let rec = record("+");
        let values = rec
            .get(&["seqid", "ft_type", "end", "src", "strand", "gene_id"], OnMissing::Raise)
            .unwrap();
        let values: Vec<_> = values.into_iter().map(Option::unwrap).collect();
        assert_eq!(values, vec!["chr1", "transcript", "200", "Unknown", "+", "g1"]);

        assert_eq!(rec.get(&["bla"], OnMissing::Continue).unwrap(), vec![None]);
        assert_eq!(
            rec.get(&["bla"], OnMissing::SetNa).unwrap(),
            vec![Some(".".to_string())]
        );
        assert!(matches!(
            rec.get(&["gene_id", "bla"], OnMissing::Raise),
            Err(GtfkitError::MissingAttribute(k)) if k == "bla"
        ));
        assert!(matches!(rec.get(&[""], OnMissing::Continue), Err(GtfkitError::InvalidKey(_))));
        assert_eq!(rec.lookup(""), Lookup::Invalid);
        assert_eq!(rec.lookup("nope"), Lookup::NotFound);
    }

    #[test]
    fn test_set() {
        let mut rec = record("+");
        rec.set("gene_id", "bla", OnMissing::Continue).unwrap();
        assert_eq!(rec.gene_id(), Some("bla"));

        rec.set("seqname", "chr2", OnMissing::Continue).unwrap();
        rec.set("start", "150", OnMissing::Continue).unwrap();
        assert_eq!(rec.chrom, "chr2");
        assert_eq!(rec.start, 150);
        assert!(rec.set("start", "250", OnMissing::Continue).is_err());
        assert_eq!(rec.start, 150);

        rec.set("foo", "x", OnMissing::Continue).unwrap();
        assert!(!rec.attributes.contains_key("foo"));

        assert!(matches!(
            rec.set("foo", "x", OnMissing::Raise),
            Err(GtfkitError::MissingAttribute(_))
        ));
        assert!(!rec.attributes.contains_key("foo"));

        rec.set("foo", "x", OnMissing::SetNa).unwrap();
        assert_eq!(rec.attributes.get("foo"), Some("."));
    }

    #[test]
    fn test_add_attr_upserts() {
        let mut rec = record("+");
        rec.add_attr("foo", "bar");
        rec.add_attr("foo", "baz");
        assert_eq!(rec.attributes.get("foo"), Some("baz"));
        assert_eq!(rec.attributes.len(), 3);
    }

    #[test]
    fn test_format_gtf() {
        let rec = record("+");
        let line = rec.format_gtf(&FormatOptions::default());
        assert_eq!(
            line,
            "chr1\tUnknown\ttranscript\t100\t200\t.\t+\t.\ttranscript_id \"g1t1\"; gene_id \"g1\";"
        );
        let prefixed = rec.format_gtf(&FormatOptions { add_chr: true });
        assert!(prefixed.starts_with("chrchr1\t"));

        let column = line.split('\t').nth(8).unwrap();
        assert_eq!(AttributeStore::parse(column).unwrap(), rec.attributes);
    }

    #[test]
    fn test_format_tab() {
        let rec = record("+");
        assert_eq!(
            rec.format_tab(&["transcript_id"], "\t"),
            "chr1\tUnknown\ttranscript\t100\t200\t.\t+\t.\tg1t1"
        );
        assert_eq!(
            rec.format_tab(&["gene_id", "missing"], ","),
            "chr1,Unknown,transcript,100,200,.,+,.,g1,."
        );
    }

    #[test]
    fn test_format_bed() {
        let rec = record("-");
        let opts = FormatOptions::default();
        assert_eq!(rec.format_bed(None, BedVariant::Bed3, &opts).unwrap(), "chr1\t99\t200");
        assert_eq!(
            rec.format_bed(Some("foo"), BedVariant::Bed6, &opts).unwrap(),
            "chr1\t99\t200\tfoo\t.\t-"
        );
        assert!(rec.format_bed(None, BedVariant::Bed6, &opts).is_err());

        let mut zero = rec.clone();
        zero.start = 0;
        assert_eq!(zero.format_bed(None, BedVariant::Bed3, &opts).unwrap(), "chr1\t0\t200");

        assert_eq!("bed".parse::<BedVariant>().unwrap(), BedVariant::Bed6);
        assert!(matches!(
            "bed12".parse::<BedVariant>(),
            Err(GtfkitError::UnsupportedFormat(_))
        ));
    }

    #[test]
    fn test_strand_parse() {
        assert_eq!("+".parse::<Strand>().unwrap(), Strand::Forward);
        assert_eq!("-".parse::<Strand>().unwrap(), Strand::Reverse);
        assert_eq!(".".parse::<Strand>().unwrap(), Strand::Unknown);
        assert_eq!("?".parse::<Strand>().unwrap(), Strand::Unknown);
        assert_eq!(Strand::Reverse.as_char(), '-');
    }
}
