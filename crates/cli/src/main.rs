use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use transfair_core::{
    BundleAssembler, ClinicalRecord, ConceptMap, Direction, IdentityMapper, Router,
    TranslationTables,
};
use transfair_uuid::RandomIds;

#[derive(Parser)]
#[command(name = "transfair")]
#[command(about = "TransFAIR resource mapping CLI")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Map one bundle file and print the resulting transaction bundle
    Map {
        /// Mapping direction: bbmri2mii, mii2bbmri, bbmri2beacon or copy
        direction: Direction,
        /// Input FHIR bundle (JSON)
        bundle: PathBuf,
        /// Sample type concept map
        #[arg(long)]
        sample_type_map: Option<PathBuf>,
        /// Diagnosis ICD-10 concept map
        #[arg(long)]
        diagnosis_map: Option<PathBuf>,
        /// Cause-of-death ICD-10 concept map
        #[arg(long)]
        cause_of_death_map: Option<PathBuf>,
    },
    /// Look a code up in a concept map file
    Lookup {
        /// Concept map file (FHIR ConceptMap JSON, YAML or CSV)
        table: PathBuf,
        /// Source code
        code: String,
    },
    /// List the rules registered for a direction (all directions if omitted)
    Rules {
        direction: Option<Direction>,
    },
}

fn load_table(path: Option<PathBuf>) -> Result<Option<Arc<ConceptMap>>, Box<dyn std::error::Error>> {
    Ok(path.map(|p| ConceptMap::load(&p)).transpose()?.map(Arc::new))
}

fn map_bundle(
    direction: Direction,
    bundle: &Path,
    tables: TranslationTables,
) -> Result<(), Box<dyn std::error::Error>> {
    let text = std::fs::read_to_string(bundle)?;
    let records: Vec<ClinicalRecord> = fhir::Bundle::parse(&text)?
        .resources()?
        .into_iter()
        .map(ClinicalRecord::from)
        .collect();

    let ids = Arc::new(RandomIds);
    let router = Router::for_direction(direction, tables, Arc::new(IdentityMapper), ids.clone())?;
    let report = router.transform_with_report(&records)?;
    eprintln!(
        "{} in, {} out, {} unmapped, {} without output, {} without id",
        report.input, report.output, report.unmapped, report.empty, report.unaddressable
    );

    let output = BundleAssembler::new(ids).assemble(report.records)?;
    println!("{}", serde_json::to_string_pretty(&output.to_json()?)?);
    Ok(())
}

fn print_rules(direction: Direction) -> Result<(), Box<dyn std::error::Error>> {
    // Rule listing only; the sample type rules need a table to be built at all.
    let placeholder = ConceptMap::from_pairs("placeholder", None, None, [("-", "-")])?;
    let tables = TranslationTables {
        sample_type: Some(Arc::new(placeholder)),
        ..TranslationTables::default()
    };
    let router = Router::for_direction(
        direction,
        tables,
        Arc::new(IdentityMapper),
        Arc::new(RandomIds),
    )?;

    println!("{direction}:");
    for (kind, name) in router.rule_names() {
        println!("  {:<14} {name}", kind.resource_type());
    }
    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Map {
            direction,
            bundle,
            sample_type_map,
            diagnosis_map,
            cause_of_death_map,
        }) => {
            let tables = TranslationTables {
                sample_type: load_table(sample_type_map)?,
                diagnosis: load_table(diagnosis_map)?,
                cause_of_death: load_table(cause_of_death_map)?,
            };
            if let Err(e) = map_bundle(direction, &bundle, tables) {
                eprintln!("Error mapping {}: {}", bundle.display(), e);
            }
        }
        Some(Commands::Lookup { table, code }) => {
            let table = ConceptMap::load(&table)?;
            match table.lookup(&code) {
                Some(target) => println!("{code} -> {target}"),
                None => println!("{code} not found in {}", table.name()),
            }
        }
        Some(Commands::Rules { direction }) => {
            let directions = match direction {
                Some(direction) => vec![direction],
                None => Direction::ALL.to_vec(),
            };
            for direction in directions {
                print_rules(direction)?;
            }
        }
        None => {
            println!("Use 'transfair --help' for commands");
        }
    }

    Ok(())
}
