use std::fs;
use std::path::{Path, PathBuf};

use liqbio::export::{Export, ExportFormat};
use liqbio::job::ConfiguredJob;
use liqbio::pipeline::caller::SomaticCaller;
use liqbio::pipeline::settings::PipelineSettings;
use liqbio::pipeline::Pipeline;
use liqbio::refdata::ReferenceData;
use liqbio::registry::SvEventType;
use liqbio::sample::capture::UniqueCapture;
use liqbio::sample::sheet::SampleSheet;

fn capture(sample_type: &str, sample_id: &str) -> UniqueCapture {
    UniqueCapture {
        project: "LB".to_string(),
        sdid: "P-NKI-1".to_string(),
        sample_type: sample_type.to_string(),
        sample_id: sample_id.to_string(),
        library_kit: "TD1".to_string(),
        capture_kit: "CS1".to_string(),
    }
}

/// Write the sample sheet and reference data of one patient with a normal and a cancer capture
fn write_inputs(dir: &Path) -> (PathBuf, PathBuf) {
    let sheet = dir.join("samples.json");
    fs::write(
        &sheet,
        r#"{"captures": [
            {"project": "LB", "sdid": "P-NKI-1", "sample_type": "N", "sample_id": "N1",
             "library_kit": "TD1", "capture_kit": "CS1", "bam": "/data/N1.bam"},
            {"project": "LB", "sdid": "P-NKI-1", "sample_type": "CFDNA", "sample_id": "C1",
             "library_kit": "TD1", "capture_kit": "CS1", "bam": "/data/C1.bam"}
        ]}"#,
    )
    .unwrap();

    let refdata = dir.join("refdata.json");
    fs::write(
        &refdata,
        r#"{
            "reference_genome": "/ref/genome.fasta",
            "reference_dict": "/ref/genome.dict",
            "exac": "/ref/exac.vcf.gz",
            "vep_dir": "/ref/vep",
            "capture_kits": {"CS1": "P"},
            "targets": {
                "P": {
                    "targets-bed-slopped20": "/ref/P.slopped20.bed.gz",
                    "targets-interval_list-slopped20": "/ref/P.slopped20.interval_list",
                    "blacklist-bed": null,
                    "purecn_targets": "/ref/P.purecn.txt"
                }
            }
        }"#,
    )
    .unwrap();
    (sheet, refdata)
}

fn build(dir: &Path, callers: Vec<SomaticCaller>) -> Pipeline {
    let (sheet, refdata) = write_inputs(dir);
    let mut settings = PipelineSettings::new("/out/P-NKI-1");
    settings.callers = callers;
    Pipeline::build(SampleSheet::read(&sheet).unwrap(), ReferenceData::read(&refdata).unwrap(), settings).unwrap()
}

fn job_kinds(jobs: &[ConfiguredJob]) -> Vec<String> {
    jobs.iter().map(|j| j.name.split('/').next().unwrap().to_string()).collect()
}

#[test]
fn normal_and_cancer_on_purity_panel() {
    let dir = tempfile::tempdir().unwrap();
    let pipeline = build(dir.path(), vec![]);
    let jobs = pipeline.jobs();

    let kinds = job_kinds(jobs);
    let mut expected = vec!["svcaller"; 8];
    expected.extend(["manta-somatic", "purecn", "liqbio-cna"]);
    assert_eq!(kinds, expected);
    assert!(jobs[..4].iter().all(|j| j.inputs.contains(&"/data/N1.bam".to_string())));
    assert!(jobs[4..8].iter().all(|j| j.inputs.contains(&"/data/C1.bam".to_string())));

    let normal = capture("N", "N1");
    let cancer = capture("CFDNA", "C1");
    let registry = pipeline.registry();
    let registered_gtfs: Vec<String> = [&cancer, &normal]
        .into_iter()
        .flat_map(|c| SvEventType::ALL.map(|e| registry.capture_svs(c, e).unwrap().gtf.clone()))
        .collect();

    let plot = &jobs[10];
    assert_eq!(plot.inputs[4..], registered_gtfs[..]);
    assert_eq!(plot.inputs[..4], jobs[9].outputs[..]);
    assert_eq!(
        registry.cna(&normal, &cancer).unwrap().cna_json,
        "/out/P-NKI-1/variants/LB-P-NKI-1-N-N1-TD1-CS1-LB-P-NKI-1-CFDNA-C1-TD1-CS1-liqbio-cna.json"
    );
}

#[test]
fn identical_inputs_give_identical_outputs() {
    let dir = tempfile::tempdir().unwrap();
    let callers = vec![SomaticCaller::Vardict, SomaticCaller::Strelka, SomaticCaller::Mutect2, SomaticCaller::Varscan];
    let first = build(dir.path(), callers.clone());
    let second = build(dir.path(), callers);

    assert_eq!(first.output_paths(), second.output_paths());
    assert_eq!(job_kinds(first.jobs()), job_kinds(second.jobs()));
}

#[test]
fn exports_configured_graph() {
    let dir = tempfile::tempdir().unwrap();
    let pipeline = build(dir.path(), vec![SomaticCaller::Vardict]);

    let export = Export::new(ExportFormat::Json, None, dir.path(), false);
    export.write(pipeline.jobs(), &pipeline.settings.outdir).unwrap();
    let written: Vec<ConfiguredJob> = serde_json::from_str(&fs::read_to_string(&export.path).unwrap()).unwrap();
    assert_eq!(written, pipeline.jobs());

    let export = Export::new(ExportFormat::Script, None, dir.path(), false);
    export.write(pipeline.jobs(), &pipeline.settings.outdir).unwrap();
    let script = fs::read_to_string(&export.path).unwrap();
    assert_eq!(script.matches("\n\n# ").count(), pipeline.jobs().len());
}
