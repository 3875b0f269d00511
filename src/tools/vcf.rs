use crate::command::CommandLine;

/// Decompose multi-allelic records and left-align indels against `reference`
pub fn split_and_leftalign(job: &str, reference: Option<&str>, allow_ref_mismatches: bool) -> Vec<CommandLine> {
    vec![
        CommandLine::new(job, "vt decompose -s -"),
        CommandLine::new(job, "vt normalize")
            .conditional(allow_ref_mismatches, "-n")
            .required("-r", "reference_sequence", reference)
            .arg("-"),
    ]
}

/// Replace IUPAC ambiguity codes in REF with N so downstream tools accept the record
pub fn fix_ambiguous(job: &str) -> CommandLine {
    CommandLine::new(job, r#"awk -F '\t' 'BEGIN { OFS = "\t" } /^#/ { print; next } { gsub(/[RYSWKMBDHV]/, "N", $4); print }'"#)
}

/// Drop records repeated at the same position with the same alleles
pub fn remove_duplicates(job: &str) -> CommandLine {
    CommandLine::new(job, r#"awk -F '\t' '/^#/ { print; next } !seen[$1 FS $2 FS $4 FS $5]++'"#)
}

/// Keep header lines and PASS records of a bgzipped VCF
pub fn filter_pass(job: &str, input: Option<&str>, output: Option<&str>) -> CommandLine {
    CommandLine::new(job, "zcat")
        .required("", "input_vcf", input)
        .arg(r#"| awk 'BEGIN { OFS = "\t" } /^#/ { print $0 } { if ($7 == "PASS") print $0 }'"#)
        .required("| bgzip >", "output_vcf", output)
        .required("&& tabix -p vcf", "output_vcf", output)
}
