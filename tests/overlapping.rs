use flate2::write::GzEncoder;
use flate2::Compression as GzCompression;
use gtfkit::{overlapping, GtfkitError, OverlapConfig, OverlapFlags, RegionPolicy};
use indoc::indoc;
use std::io::Write;
use std::path::{Path, PathBuf};

const GTF: &str = indoc! {"
    ##description: toy annotation
    chr1\tsrc\tgene\t100\t200\t.\t+\t.\tgene_id \"gA\";
    chr1\tsrc\ttranscript\t100\t200\t.\t+\t.\tgene_id \"gA\"; transcript_id \"tA1\";
    chr1\tsrc\texon\t100\t200\t.\t+\t.\tgene_id \"gA\"; transcript_id \"tA1\"; exon_number \"1\";
    chr1\tsrc\ttranscript\t195\t250\t.\t+\t.\tgene_id \"gB\"; transcript_id \"tB1\";
    chr1\tsrc\texon\t195\t250\t.\t+\t.\tgene_id \"gB\"; transcript_id \"tB1\"; exon_number \"1\";
    chr1\tsrc\ttranscript\t400\t500\t.\t-\t.\tgene_id \"gC\"; transcript_id \"tC1\";
    chr1\tsrc\ttranscript\t450\t520\t.\t-\t.\tgene_id \"gC\"; transcript_id \"tC2\";
    chr1\tsrc\ttranscript\t600\t700\t.\t+\t.\tgene_id \"gD\"; transcript_id \"tD1\";
    chr1\tsrc\ttranscript\t702\t800\t.\t-\t.\tgene_id \"gE\"; transcript_id \"tE1\";
    chr1\tsrc\texon\t702\t800\t.\t-\t.\tgene_id \"gE\"; transcript_id \"tE1\"; exon_number \"1\";
"};

/// Writes a file to the temporary directory and returns its path.
fn write_temp_file(dir: &Path, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, contents).unwrap();
    path
}

/// Writes gz-compressed contents to a file and returns its path.
fn write_gzip_file(dir: &Path, name: &str, contents: &str) -> PathBuf {
    let mut encoder = GzEncoder::new(Vec::new(), GzCompression::default());
    encoder.write_all(contents.as_bytes()).unwrap();
    let gz = encoder.finish().unwrap();

    let path = dir.join(name);
    std::fs::write(&path, gz).unwrap();
    path
}

fn config(
    dir: &Path,
    input: PathBuf,
    policy: RegionPolicy,
    flank: u64,
    flags: OverlapFlags,
) -> OverlapConfig {
    let chrom = write_temp_file(dir, "chrom.txt", "chr1\t1000\n");
    OverlapConfig::new(
        input,
        dir.join("output.gtf"),
        chrom,
        2,
        flank,
        flank,
        policy,
        flags,
    )
    .unwrap()
}

/// Runs the pipeline and returns the transcript ids of the output lines,
/// one entry per line.
fn run_ids(config: &OverlapConfig) -> Vec<String> {
    overlapping::run(config).unwrap();
    let output = std::fs::read_to_string(&config.output).unwrap();
    output
        .lines()
        .map(|line| {
            let attrs = line.split('\t').nth(8).unwrap();
            gtfkit::AttributeStore::parse(attrs)
                .unwrap()
                .get("transcript_id")
                .unwrap_or("-")
                .to_string()
        })
        .collect()
}

/// Body overlap between two genes keeps both transcripts and their exons.
#[test]
fn keeps_cross_gene_body_overlaps() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_temp_file(dir.path(), "input.gtf", GTF);
    let config = config(dir.path(), input, RegionPolicy::Whole, 0, OverlapFlags::default());

    let ids = run_ids(&config);
    assert_eq!(ids, vec!["tA1", "tA1", "tB1", "tB1"]);
}

/// Same-gene overlap (tC1/tC2) is never reported, so both show up inverted.
#[test]
fn invert_reports_non_overlapping_records() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_temp_file(dir.path(), "input.gtf", GTF);
    let flags = OverlapFlags {
        invert_match: true,
        ..Default::default()
    };
    let config = config(dir.path(), input, RegionPolicy::Whole, 0, flags);

    let ids = run_ids(&config);
    assert_eq!(ids, vec!["-", "tC1", "tC2", "tD1", "tE1", "tE1"]);
}

/// TTS regions extended by 2 bp reach across the gD/gE boundary.
#[test]
fn tts_regions_with_strand_filters() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_temp_file(dir.path(), "input.gtf", GTF);

    let any = config(dir.path(), input.clone(), RegionPolicy::ThreePrime, 2, OverlapFlags::default());
    assert_eq!(run_ids(&any), vec!["tA1", "tA1", "tD1", "tE1", "tE1"]);

    let same = config(
        dir.path(),
        input.clone(),
        RegionPolicy::ThreePrime,
        2,
        OverlapFlags {
            same_strandedness: true,
            ..Default::default()
        },
    );
    assert_eq!(run_ids(&same), vec!["tA1", "tA1"]);

    let opposite = config(
        dir.path(),
        input,
        RegionPolicy::ThreePrime,
        2,
        OverlapFlags {
            diff_strandedness: true,
            ..Default::default()
        },
    );
    assert_eq!(run_ids(&opposite), vec!["tD1", "tE1", "tE1"]);
}

/// Annotation keeps every line and tags only overlapping transcript lines.
#[test]
fn annotate_adds_partner_attribute() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_temp_file(dir.path(), "input.gtf", GTF);
    let flags = OverlapFlags {
        annotate_gtf: true,
        ..Default::default()
    };
    let config = config(dir.path(), input, RegionPolicy::ThreePrime, 2, flags);

    let stats = overlapping::run(&config).unwrap();
    assert_eq!(stats.records_in, 10);
    assert_eq!(stats.records_out, 10);

    let output = std::fs::read_to_string(&config.output).unwrap();
    let tagged: Vec<&str> = output
        .lines()
        .filter(|l| l.contains("overlap_tts_u0.002k_d0.002k"))
        .collect();
    assert_eq!(tagged.len(), 3);
    assert!(tagged[0].contains("transcript_id \"tA1\"; overlap_tts_u0.002k_d0.002k \"tB1\";"));
    assert!(tagged[1].contains("transcript_id \"tD1\"; overlap_tts_u0.002k_d0.002k \"tE1\";"));
    assert!(tagged[2].starts_with("chr1\tsrc\ttranscript\t702\t800"));
}

/// Gzip input is read transparently.
#[test]
fn reads_gzipped_input() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_gzip_file(dir.path(), "input.gtf.gz", GTF);
    let config = config(dir.path(), input, RegionPolicy::Whole, 0, OverlapFlags::default());

    assert_eq!(run_ids(&config), vec!["tA1", "tA1", "tB1", "tB1"]);
}

/// Exclusive flags fail before the input is touched.
#[test]
fn rejects_annotate_with_invert() {
    let res = OverlapConfig::new(
        PathBuf::from("does/not/exist.gtf"),
        PathBuf::from("out.gtf"),
        PathBuf::from("does/not/exist.txt"),
        1,
        0,
        0,
        RegionPolicy::Whole,
        OverlapFlags {
            annotate_gtf: true,
            invert_match: true,
            ..Default::default()
        },
    );
    assert!(matches!(res, Err(GtfkitError::InvalidConfiguration(_))));
}

/// An unstranded transcript cannot be flanked: it is left out of the
/// queries but still counts as a reference for the others.
#[test]
fn skips_unstranded_transcript_queries() {
    let dir = tempfile::tempdir().unwrap();
    let gtf = indoc! {"
        chr1\tsrc\ttranscript\t100\t200\t.\t+\t.\tgene_id \"gA\"; transcript_id \"tA\";
        chr1\tsrc\ttranscript\t150\t250\t.\t+\t.\tgene_id \"gB\"; transcript_id \"tB\";
        chr1\tsrc\ttranscript\t800\t900\t.\t.\t.\tgene_id \"gC\"; transcript_id \"tC\";
    "};
    let input = write_temp_file(dir.path(), "input.gtf", gtf);

    let keep = config(dir.path(), input.clone(), RegionPolicy::Whole, 1500, OverlapFlags::default());
    let stats = overlapping::run(&keep).unwrap();
    assert_eq!(stats.records_in, 3);
    assert_eq!(run_ids(&keep), vec!["tA", "tB"]);

    let flags = OverlapFlags {
        annotate_gtf: true,
        key_name: Some("partners".to_string()),
        ..Default::default()
    };
    let annotate = config(dir.path(), input, RegionPolicy::Whole, 1500, flags);
    overlapping::run(&annotate).unwrap();
    let output = std::fs::read_to_string(&annotate.output).unwrap();
    let lines: Vec<&str> = output.lines().collect();
    assert_eq!(lines.len(), 3);
    assert!(lines[0].ends_with("transcript_id \"tA\"; partners \"tB,tC\";"));
    assert!(lines[1].ends_with("transcript_id \"tB\"; partners \"tA,tC\";"));
    assert!(lines[2].ends_with("transcript_id \"tC\";"));
}

/// A transcript on a chromosome absent from the size table is fatal.
#[test]
fn unknown_chromosome_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let gtf = "chr9\tsrc\ttranscript\t1\t10\t.\t+\t.\tgene_id \"g\"; transcript_id \"t\";\n";
    let input = write_temp_file(dir.path(), "input.gtf", gtf);
    let config = config(dir.path(), input, RegionPolicy::Whole, 0, OverlapFlags::default());

    assert!(matches!(
        overlapping::run(&config),
        Err(GtfkitError::UnknownChromosome(c)) if c == "chr9"
    ));
}
