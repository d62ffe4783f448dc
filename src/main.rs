use std::io::{self, Write};

use anyhow::Result;
use log::info;
use widevar::{
    column::ExtraSampleData, DecodedVariant, Decoder, DecoderOptionsBuilder, FieldDefinition,
    FieldNumber, FieldType, GenotypeGroupRow, InMemoryMetadata, MemoryRow, StudyMetadata,
    VariantCoordinate,
};

const STUDY_ID: u32 = 1;
const SAMPLES: [&str; 5] = ["NA001", "NA002", "NA003", "NA004", "NA005"];

fn build_metadata() -> InMemoryMetadata {
    let mut study = StudyMetadata::new(STUDY_ID, "demo");
    for (id, name) in (1..).zip(SAMPLES) {
        study.index_sample(id, name);
    }
    study.extra_genotype_fields = vec!["FT".to_string(), "AD".to_string()];
    study
        .field_definitions
        .push(FieldDefinition::new("AD", FieldNumber::PerAllele, FieldType::Integer));

    let metadata = InMemoryMetadata::new();
    metadata.insert(study);
    metadata
}

fn build_rows() -> Vec<MemoryRow> {
    // two samples stored against different secondary alternates
    let multi_allelic = VariantCoordinate::new("1", 1000, "A", "C");
    let mut first = MemoryRow::new(multi_allelic);
    first.add_main_data(STUDY_ID, 1, &["0/1", "PASS", "10,5,0", "1:1000:1000:A:G:SNV"]);
    first.add_main_data(STUDY_ID, 2, &["0/2", "PASS", "8,0,4", "1:1000:1001:AT:-:DEL"]);
    first.add_extra_data(
        STUDY_ID,
        2,
        &ExtraSampleData::default()
            .with("DP", "12")
            .with_file("demo.vcf.gz", "1:1000:A:C,T", Default::default()),
    );

    // a legacy genotype-group row
    let legacy_variant = VariantCoordinate::new("1", 2000, "G", "T");
    let mut legacy = GenotypeGroupRow::new(STUDY_ID, &legacy_variant);
    legacy.add_genotype("0/1", 3);
    legacy.add_complex_genotype(4, "1/1,0/1");
    legacy.add_filter("LowQual", 4);
    legacy.hom_ref_count = 3;
    legacy.pass_count = 4;
    let mut second = MemoryRow::new(legacy_variant);
    second.add_legacy_row(&legacy);

    vec![first, second]
}

fn write_decoded<W: Write>(writer: &mut W, decoded: &DecodedVariant) -> Result<()> {
    for record in decoded.studies.values() {
        writeln!(writer, "{}\tstudy={}", decoded.variant, record.study_id())?;
        writeln!(writer, "\tformat\t{}", record.format().join(":"))?;
        for alt in record.secondary_alternates() {
            writeln!(writer, "\tsecondary\t{alt}")?;
        }
        for (name, data) in record.iter_samples() {
            writeln!(writer, "\t{name}\t{}", data.unwrap_or_default().join(":"))?;
        }
    }
    for warning in &decoded.warnings {
        writeln!(writer, "\twarning\t{warning}")?;
    }
    Ok(())
}

fn main() -> Result<()> {
    env_logger::builder()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();

    let options = DecoderOptionsBuilder::default()

        .simple_genotypes(true)

        .build();
    let decoder = Decoder::new(build_metadata(), options);

    let mut writer = io::BufWriter::new(io::stdout());
    let rows = build_rows();
    for row in &rows {
        let decoded = decoder.decode(row)?;
        write_decoded(&mut writer, &decoded)?;
    }
    writer.flush()?;
    info!("Decoded {} rows", rows.len());

    Ok(())
}
