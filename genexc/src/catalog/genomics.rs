//! Genotype, variant, allele, locus and interval accessors.

use std::sync::Arc;

use genex_stats::binomial_test;

use crate::error::{EvalError, RegistrationError};
use crate::genomics::{AltAllele, Genotype, Interval, Locus, Variant};
use crate::registry::RegistryBuilder;

fn present(items: &[i32]) -> Vec<Option<i32>> {
    items.iter().copied().map(Some).collect()
}

/// Allele balance p-value of a heterozygote: a two-sided binomial test of
/// the two called alleles' depths against 1/2.
fn allele_balance(g: &Genotype) -> Option<Result<f64, EvalError>> {
    let (a, b) = g.het_depths()?;
    let (a, b) = (i64::from(a), i64::from(b));
    Some(binomial_test(a, a + b, 0.5).map_err(|err| EvalError::invalid_argument("pAB", err)))
}

fn install_genotype(b: &mut RegistryBuilder) -> Result<(), RegistrationError> {
    b.field_opt("gt", |g: Arc<Genotype>| g.gt)?
        .field_opt("gtj", |g: Arc<Genotype>| g.gtj())?
        .field_opt("gtk", |g: Arc<Genotype>| g.gtk())?
        .field_opt("ad", |g: Arc<Genotype>| g.ad.as_deref().map(present))?
        .field_opt("dp", |g: Arc<Genotype>| g.dp)?
        .field_opt("gq", |g: Arc<Genotype>| g.gq)?
        .field_opt("pl", |g: Arc<Genotype>| g.pl.as_deref().map(present))?
        .field_opt("od", |g: Arc<Genotype>| g.od())?;

    b.field("isHomRef", |g: Arc<Genotype>| g.is_hom_ref())?
        .field("isHet", |g: Arc<Genotype>| g.is_het())?
        .field("isHomVar", |g: Arc<Genotype>| g.is_hom_var())?
        .field("isCalledNonRef", |g: Arc<Genotype>| g.is_called_non_ref())?
        .field("isHetNonRef", |g: Arc<Genotype>| g.is_het_non_ref())?
        .field("isHetRef", |g: Arc<Genotype>| g.is_het_ref())?
        .field("isCalled", |g: Arc<Genotype>| g.is_called())?
        .field("isNotCalled", |g: Arc<Genotype>| !g.is_called())?
        .field_opt("nNonRefAlleles", |g: Arc<Genotype>| g.n_non_ref_alleles())?
        .field_opt("fractionReadsRef", |g: Arc<Genotype>| g.fraction_reads_ref())?
        .field_opt("pAB", |g: Arc<Genotype>| allele_balance(&g))?
        .field("fakeRef", |g: Arc<Genotype>| g.fake_ref)?;
    Ok(())
}

fn install_variant(b: &mut RegistryBuilder) -> Result<(), RegistrationError> {
    b.field("contig", |v: Arc<Variant>| v.contig.clone())?
        .field("start", |v: Arc<Variant>| v.start)?
        .field("ref", |v: Arc<Variant>| v.reference.clone())?
        .field("altAlleles", |v: Arc<Variant>| {
            v.alt_alleles.iter().cloned().map(Some).collect::<Vec<_>>()
        })?
        .field("nAltAlleles", |v: Arc<Variant>| v.alt_alleles.len() as i32)?
        .field("nAlleles", |v: Arc<Variant>| v.n_alleles())?
        .field("nGenotypes", |v: Arc<Variant>| v.n_genotypes())?
        .field("isBiallelic", |v: Arc<Variant>| v.is_biallelic())?
        .field_opt("altAllele", |v: Arc<Variant>| v.alt_allele().cloned())?
        .field_opt("alt", |v: Arc<Variant>| v.alt_allele().map(|a| a.alt.clone()))?
        .field("locus", |v: Arc<Variant>| v.locus())?
        .field("inXPar", |v: Arc<Variant>| v.in_x_par())?
        .field("inYPar", |v: Arc<Variant>| v.in_y_par())?
        .field("inXNonPar", |v: Arc<Variant>| v.in_x_non_par())?
        .field("inYNonPar", |v: Arc<Variant>| v.in_y_non_par())?
        .field("isAutosomal", |v: Arc<Variant>| v.is_autosomal())?;
    Ok(())
}

fn install_alt_allele(b: &mut RegistryBuilder) -> Result<(), RegistrationError> {
    b.field("ref", |a: Arc<AltAllele>| a.reference.clone())?
        .field("alt", |a: Arc<AltAllele>| a.alt.clone())?
        .field("isSNP", |a: Arc<AltAllele>| a.is_snp())?
        .field("isMNP", |a: Arc<AltAllele>| a.is_mnp())?
        .field("isInsertion", |a: Arc<AltAllele>| a.is_insertion())?
        .field("isDeletion", |a: Arc<AltAllele>| a.is_deletion())?
        .field("isIndel", |a: Arc<AltAllele>| a.is_indel())?
        .field("isComplex", |a: Arc<AltAllele>| a.is_complex())?
        .field("isTransition", |a: Arc<AltAllele>| a.is_transition())?
        .field("isTransversion", |a: Arc<AltAllele>| a.is_transversion())?;
    Ok(())
}

fn install_locus(b: &mut RegistryBuilder) -> Result<(), RegistrationError> {
    b.field("contig", |l: Arc<Locus>| l.contig.clone())?
        .field("position", |l: Arc<Locus>| l.position)?
        .field("start", |i: Arc<Interval>| i.start.clone())?
        .field("end", |i: Arc<Interval>| i.end.clone())?
        .method1("contains", |i: Arc<Interval>, l: Arc<Locus>| i.contains(&l))?;
    Ok(())
}

fn make_variant(
    contig: String,
    start: i32,
    reference: String,
    alts: String,
) -> Result<Variant, EvalError> {
    let alts: Vec<&str> = alts.split(',').collect();
    if contig.is_empty() || reference.is_empty() || alts.iter().any(|a| a.is_empty()) {
        return Err(EvalError::invalid_argument(
            "Variant",
            format!("invalid variant {contig}:{start}:{reference}:{}", alts.join(",")),
        ));
    }
    Ok(Variant::new(contig, start, reference, &alts))
}

fn install_constructors(b: &mut RegistryBuilder) -> Result<(), RegistrationError> {
    b.function1_opt("Locus", |s: String| s.parse::<Locus>().ok())?
        .function2("Locus", |contig: String, position: i32| Locus::new(contig, position))?
        .function1_opt("Variant", |s: String| s.parse::<Variant>().ok())?
        .function4("Variant", make_variant)?
        .function2("Interval", |start: Arc<Locus>, end: Arc<Locus>| {
            Interval::new((*start).clone(), (*end).clone())
        })?;
    Ok(())
}

pub fn install(b: &mut RegistryBuilder) -> Result<(), RegistrationError> {
    install_genotype(b)?;
    install_variant(b)?;
    install_alt_allele(b)?;
    install_locus(b)?;
    install_constructors(b)
}
