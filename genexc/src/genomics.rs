//! Domain records exposed to expressions: genotypes, variants and loci.
//!
//! These are plain data with the derived queries the built-in catalog
//! exposes as fields. Coordinates follow GRCh37 (pseudoautosomal regions
//! below are GRCh37 positions).

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Pseudoautosomal regions of chromosome X (1-based, inclusive).
const X_PAR: [(i32, i32); 2] = [(60_001, 2_699_520), (154_931_044, 155_260_560)];

/// Pseudoautosomal regions of chromosome Y (1-based, inclusive).
const Y_PAR: [(i32, i32); 2] = [(10_001, 2_649_520), (59_034_050, 59_363_566)];

/// Error parsing a locus or variant from text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("cannot parse {what} from `{input}`")]
pub struct ParseRecordError {
    pub what: &'static str,
    pub input: String,
}

/// One sample's call at one variant.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Genotype {
    /// Index of the called unordered allele pair, if called.
    pub gt: Option<i32>,
    /// Allelic depths, one per allele.
    pub ad: Option<Vec<i32>>,
    /// Total read depth.
    pub dp: Option<i32>,
    /// Genotype quality.
    pub gq: Option<i32>,
    /// Phred-scaled genotype likelihoods.
    pub pl: Option<Vec<i32>>,
    /// Set when the call was filled in as reference rather than observed.
    pub fake_ref: bool,
}

/// Decode a genotype index into its allele pair `(j, k)` with `j <= k`.
///
/// Genotype indices enumerate unordered pairs as `k * (k + 1) / 2 + j`.
/// Negative indices do not name a pair and decode to `None`.
pub fn gt_pair(gt: i32) -> Option<(i32, i32)> {
    let gt = i64::from(gt);
    if gt < 0 {
        return None;
    }
    let mut k = ((((8 * gt + 1) as f64).sqrt() - 1.0) / 2.0) as i64;
    // Guard against floating point rounding at triangle boundaries.
    while k * (k + 1) / 2 > gt {
        k -= 1;
    }
    while (k + 1) * (k + 2) / 2 <= gt {
        k += 1;
    }
    let j = gt - k * (k + 1) / 2;
    Some((i32::try_from(j).ok()?, i32::try_from(k).ok()?))
}

impl Genotype {
    /// A called genotype with no other data.
    pub fn called(gt: i32) -> Self {
        Self { gt: Some(gt), ..Self::default() }
    }

    fn pair(&self) -> Option<(i32, i32)> {
        self.gt.and_then(gt_pair)
    }

    pub fn gtj(&self) -> Option<i32> {
        self.pair().map(|(j, _)| j)
    }

    pub fn gtk(&self) -> Option<i32> {
        self.pair().map(|(_, k)| k)
    }

    pub fn is_hom_ref(&self) -> bool {
        self.gt == Some(0)
    }

    pub fn is_het(&self) -> bool {
        matches!(self.pair(), Some((j, k)) if j != k)
    }

    pub fn is_hom_var(&self) -> bool {
        matches!(self.pair(), Some((j, k)) if j == k && k > 0)
    }

    pub fn is_called_non_ref(&self) -> bool {
        matches!(self.gt, Some(gt) if gt > 0)
    }

    pub fn is_het_non_ref(&self) -> bool {
        matches!(self.pair(), Some((j, k)) if j > 0 && j != k)
    }

    pub fn is_het_ref(&self) -> bool {
        matches!(self.pair(), Some((0, k)) if k > 0)
    }

    pub fn is_called(&self) -> bool {
        self.pair().is_some()
    }

    pub fn n_non_ref_alleles(&self) -> Option<i32> {
        self.pair().map(|(j, k)| i32::from(j != 0) + i32::from(k != 0))
    }

    /// Reads not accounted for by the allelic depths.
    pub fn od(&self) -> Option<i32> {
        match (self.dp, &self.ad) {
            (Some(dp), Some(ad)) => Some(dp - ad.iter().sum::<i32>()),
            _ => None,
        }
    }

    pub fn fraction_reads_ref(&self) -> Option<f64> {
        let ad = self.ad.as_ref()?;
        let total: i32 = ad.iter().sum();
        let reference = *ad.first()?;
        (total > 0).then(|| f64::from(reference) / f64::from(total))
    }

    /// Depths of the two called alleles of a heterozygote.
    pub fn het_depths(&self) -> Option<(i32, i32)> {
        let (j, k) = self.pair().filter(|(j, k)| j != k)?;
        let ad = self.ad.as_ref()?;
        Some((*ad.get(j as usize)?, *ad.get(k as usize)?))
    }
}

/// A reference/alternate allele pair.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AltAllele {
    pub reference: String,
    pub alt: String,
}

impl AltAllele {
    pub fn new(reference: impl Into<String>, alt: impl Into<String>) -> Self {
        Self { reference: reference.into(), alt: alt.into() }
    }

    fn is_star(&self) -> bool {
        self.alt == "*"
    }

    fn n_mismatch(&self) -> usize {
        self.reference
            .chars()
            .zip(self.alt.chars())
            .filter(|(r, a)| !r.eq_ignore_ascii_case(a))
            .count()
    }

    fn lengths(&self) -> (usize, usize) {
        (self.reference.chars().count(), self.alt.chars().count())
    }

    pub fn is_snp(&self) -> bool {
        let (r, a) = self.lengths();
        !self.is_star() && ((r == 1 && a == 1) || (r == a && self.n_mismatch() == 1))
    }

    pub fn is_mnp(&self) -> bool {
        let (r, a) = self.lengths();
        r > 1 && r == a && self.n_mismatch() > 1
    }

    pub fn is_insertion(&self) -> bool {
        let (r, a) = self.lengths();
        r < a && shares_anchor(&self.reference, &self.alt)
    }

    pub fn is_deletion(&self) -> bool {
        let (r, a) = self.lengths();
        a < r && shares_anchor(&self.alt, &self.reference)
    }

    pub fn is_indel(&self) -> bool {
        self.is_insertion() || self.is_deletion()
    }

    pub fn is_complex(&self) -> bool {
        !self.is_star() && !self.is_snp() && !self.is_mnp() && !self.is_indel()
    }

    /// The differing base pair of a SNP, upper-cased.
    fn snp_pair(&self) -> Option<(char, char)> {
        self.reference
            .chars()
            .zip(self.alt.chars())
            .find(|(r, a)| !r.eq_ignore_ascii_case(a))
            .map(|(r, a)| (r.to_ascii_uppercase(), a.to_ascii_uppercase()))
    }

    pub fn is_transition(&self) -> bool {
        self.is_snp()
            && matches!(
                self.snp_pair(),
                Some(('A', 'G') | ('G', 'A') | ('C', 'T') | ('T', 'C'))
            )
    }

    pub fn is_transversion(&self) -> bool {
        self.is_snp() && !self.is_transition()
    }
}

/// Whether `short` and `long` start with the same base and `long` ends
/// with the rest of `short`.
fn shares_anchor(short: &str, long: &str) -> bool {
    let mut rest = short.chars();
    match (rest.next(), long.chars().next()) {
        (Some(s), Some(l)) => s == l && long.ends_with(rest.as_str()),
        _ => false,
    }
}

/// A position on a contig.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Locus {
    pub contig: String,
    pub position: i32,
}

impl Locus {
    pub fn new(contig: impl Into<String>, position: i32) -> Self {
        Self { contig: contig.into(), position }
    }
}

/// Sort key for contigs: autosomes numerically, then X, Y, MT, then the rest.
fn contig_rank(contig: &str) -> (u32, u32, &str) {
    match contig.parse::<u32>() {
        Ok(n) => (0, n, ""),
        Err(_) => match contig {
            "X" => (1, 0, ""),
            "Y" => (2, 0, ""),
            "MT" => (3, 0, ""),
            other => (4, 0, other),
        },
    }
}

impl Ord for Locus {
    fn cmp(&self, other: &Self) -> Ordering {
        contig_rank(&self.contig)
            .cmp(&contig_rank(&other.contig))
            .then(self.position.cmp(&other.position))
    }
}

impl PartialOrd for Locus {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Locus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.contig, self.position)
    }
}

impl FromStr for Locus {
    type Err = ParseRecordError;

    /// Parse `contig:position`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParseRecordError { what: "locus", input: s.to_string() };
        let (contig, position) = s.rsplit_once(':').ok_or_else(err)?;
        let position = position.parse().map_err(|_| err())?;
        if contig.is_empty() {
            return Err(err());
        }
        Ok(Locus::new(contig, position))
    }
}

/// A half-open range of loci `[start, end)`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Interval {
    pub start: Locus,
    pub end: Locus,
}

impl Interval {
    pub fn new(start: Locus, end: Locus) -> Self {
        Self { start, end }
    }

    pub fn contains(&self, locus: &Locus) -> bool {
        &self.start <= locus && locus < &self.end
    }
}

/// A site with one reference allele and one or more alternates.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Variant {
    pub contig: String,
    pub start: i32,
    pub reference: String,
    pub alt_alleles: Vec<AltAllele>,
}

impl Variant {
    pub fn new(
        contig: impl Into<String>,
        start: i32,
        reference: impl Into<String>,
        alts: &[&str],
    ) -> Self {
        let reference = reference.into();
        let alt_alleles = alts
            .iter()
            .map(|alt| AltAllele::new(reference.clone(), *alt))
            .collect();
        Self { contig: contig.into(), start, reference, alt_alleles }
    }

    pub fn n_alleles(&self) -> i32 {
        self.alt_alleles.len() as i32 + 1
    }

    pub fn n_genotypes(&self) -> i32 {
        let n = self.n_alleles();
        n * (n + 1) / 2
    }

    pub fn is_biallelic(&self) -> bool {
        self.alt_alleles.len() == 1
    }

    /// The single alternate allele of a biallelic variant.
    pub fn alt_allele(&self) -> Option<&AltAllele> {
        match self.alt_alleles.as_slice() {
            [only] => Some(only),
            _ => None,
        }
    }

    pub fn locus(&self) -> Locus {
        Locus::new(self.contig.clone(), self.start)
    }

    fn in_regions(&self, regions: &[(i32, i32)]) -> bool {
        regions
            .iter()
            .any(|&(lo, hi)| (lo..=hi).contains(&self.start))
    }

    pub fn in_x_par(&self) -> bool {
        self.contig == "X" && self.in_regions(&X_PAR)
    }

    pub fn in_y_par(&self) -> bool {
        self.contig == "Y" && self.in_regions(&Y_PAR)
    }

    pub fn in_x_non_par(&self) -> bool {
        self.contig == "X" && !self.in_regions(&X_PAR)
    }

    pub fn in_y_non_par(&self) -> bool {
        self.contig == "Y" && !self.in_regions(&Y_PAR)
    }

    pub fn is_autosomal(&self) -> bool {
        !matches!(self.contig.as_str(), "X" | "Y" | "MT")
    }
}

impl FromStr for Variant {
    type Err = ParseRecordError;

    /// Parse `contig:start:ref:alt1,alt2,...`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParseRecordError { what: "variant", input: s.to_string() };
        let mut parts = s.split(':');
        let (Some(contig), Some(start), Some(reference), Some(alts), None) =
            (parts.next(), parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return Err(err());
        };
        let start = start.parse().map_err(|_| err())?;
        let alts: Vec<&str> = alts.split(',').collect();
        if contig.is_empty() || reference.is_empty() || alts.iter().any(|a| a.is_empty()) {
            return Err(err());
        }
        Ok(Variant::new(contig, start, reference, &alts))
    }
}
