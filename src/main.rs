use clap::Parser;
use serde_derive::{Deserialize, Serialize};
use std::{error::Error, fs, path::Path};
use tetra_gluings::{
    engine::{read_from_engine, write_to_engine, MemoryEngine},
    Conflict, EditOutcome, Label, Perm4, Target, Tetrahedron, Triangulation,
};
use thiserror::Error;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

type Result<T> = std::result::Result<T, Box<dyn Error>>;

fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
    println!();
    println!("Running...");

    // parse commandline arguments
    let args = Args::parse();

    // load config
    let config = load_config(&args)?;

    // scripted edits
    let mut triangulation = Triangulation::new();
    for tet in &config.tetrahedra {
        let label = triangulation.add_tetrahedron();
        triangulation.set_label(label, &tet.label)?;
    }
    println!("Applying {} edits...", config.edits.len());
    for (number, edit) in config.edits.iter().enumerate() {
        let outcome = apply(&mut triangulation, edit, config.confirm_overwrites)?;
        info!(number, ?outcome, "applied edit");
    }

    // random edits
    if args.random_edits > 0 {
        println!("Applying {} random edits...", args.random_edits);
        let rng = match args.seed {
            Some(seed) => fastrand::Rng::with_seed(seed),
            None => fastrand::Rng::new(),
        };
        random_edits(&mut triangulation, &rng, args.random_edits, config.confirm_overwrites)?;
    }

    // copy to the engine and back
    println!("Synchronising with engine...");
    let mut engine = MemoryEngine::new();
    write_to_engine(&triangulation, &mut engine)?;
    let copy = read_from_engine(&engine)?;
    if copy != triangulation {
        return Err("triangulation read back from the engine differs from the one written".into());
    }

    println!();
    print!("{triangulation}");
    println!();
    println!("tetrahedra:     {}", triangulation.size());
    println!("gluings:        {}", triangulation.gluing_count());
    println!("boundary faces: {}", triangulation.boundary_faces());
    println!("components:     {}", triangulation.component_count());
    println!("closed:         {}", triangulation.is_closed());
    println!("Done!");

    Ok(())
}

fn load_config(args: &Args) -> Result<Config> {
    let path = Path::new("configs").join(format!("{}.toml", args.config));
    let config_toml = fs::read_to_string(path)?;
    let config: Config = toml::from_str(&config_toml)?;
    Ok(config)
}

fn apply(triangulation: &mut Triangulation, edit: &Edit, confirm_overwrites: bool) -> Result<EditOutcome> {
    let outcome = match edit {
        Edit::Add => {
            triangulation.add_tetrahedron();
            EditOutcome::Committed
        }
        Edit::Delete { tets } => {
            triangulation.delete_tetrahedra(tets.iter().copied())?;
            EditOutcome::Committed
        }
        Edit::Label { tet, label } => {
            if triangulation.set_label(Label::new(*tet), label)? {
                EditOutcome::Committed
            } else {
                EditOutcome::Unchanged
            }
        }
        Edit::Unglue { tet, face } => triangulation.unglue(Label::new(*tet), *face)?,
        Edit::Glue {
            tet,
            face,
            target,
            confirm,
        } => {
            let target = parse_target(target, *face)?;
            let answer = confirm.unwrap_or(confirm_overwrites);
            triangulation.glue(Label::new(*tet), *face, target, |conflict| {
                let action = if answer { "overwriting" } else { "keeping it" };
                println!("\t{}; {action}", describe_conflict(conflict));
                answer
            })?
        }
    };
    Ok(outcome)
}

fn random_edits(
    triangulation: &mut Triangulation,
    rng: &fastrand::Rng,
    amount: usize,
    confirm_overwrites: bool,
) -> Result<()> {
    let mut committed = 0;
    for _ in 0..amount {
        if triangulation.is_empty() {
            triangulation.add_tetrahedron();
        }
        let Some((tet, face, target)) = triangulation.sample_request(rng) else {
            continue;
        };
        let outcome = triangulation.glue(tet, face, target, |_| confirm_overwrites)?;
        if outcome == EditOutcome::Committed {
            committed += 1;
        }
    }
    if let Err(err) = triangulation.check_gluings() {
        warn!(%err, "random edits broke the triangulation");
        return Err(err.into());
    }
    println!("\tcommitted: {committed}");
    Ok(())
}

fn describe_conflict(conflict: &Conflict) -> String {
    match conflict {
        Conflict::GluedElsewhere {
            partner,
            partner_face,
        } => format!(
            "target face is glued to face {} of tetrahedron {partner}",
            Perm4::face_description(*partner_face)
        ),
        Conflict::Reordered { existing, requested } => {
            format!("faces are glued already, as {existing} instead of {requested}")
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
enum TargetError {
    #[error("face {0:?} should look like \"<tetrahedron> (<three vertices>)\"")]
    Malformed(String),
    #[error("{0:?} is not a tetrahedron number")]
    BadTetrahedron(String),
    #[error("face {0:?} must list three different vertices between 0 and 3")]
    BadVertices(String),
}

/// Parse a gluing target as written in the gluing table, e.g. `"1 (023)"`. An empty string is the
/// boundary.
fn parse_target(text: &str, face: usize) -> std::result::Result<Target, TargetError> {
    let text = text.trim();
    if text.is_empty() {
        return Ok(Target::Boundary);
    }
    let malformed = || TargetError::Malformed(text.to_string());

    let (tet, rest) = text.split_once('(').ok_or_else(malformed)?;
    let vertices = rest.trim_end().strip_suffix(')').ok_or_else(malformed)?.trim();
    let tet = tet.trim();
    let tet = tet
        .parse::<usize>()
        .map_err(|_| TargetError::BadTetrahedron(tet.to_string()))?;

    let bad_vertices = || TargetError::BadVertices(text.to_string());
    let digits = vertices
        .chars()
        .map(|c| c.to_digit(10).map(|d| d as usize).filter(|&d| d < 4))
        .collect::<Option<Vec<_>>>()
        .ok_or_else(bad_vertices)?;
    if digits.len() != 3 || digits[0] == digits[1] || digits[0] == digits[2] || digits[1] == digits[2] {
        return Err(bad_vertices());
    }
    let missing = 6 - digits[0] - digits[1] - digits[2];
    let images = Perm4::new([digits[0], digits[1], digits[2], missing]).ok_or_else(bad_vertices)?;

    Ok(Target::Face {
        tet: Label::<Tetrahedron>::new(tet),
        face: missing,
        perm: images.compose(&Perm4::face_ordering(face).inverse()),
    })
}

#[derive(clap::Parser, Debug)]
#[clap(author, version, about, long_about = None)]
struct Args {
    config: String,
    #[clap(long, default_value_t = 0)]
    random_edits: usize,
    #[clap(long)]
    seed: Option<u64>,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
struct Config {
    #[serde(default = "default_confirm")]
    confirm_overwrites: bool,
    #[serde(default)]
    tetrahedra: Vec<TetConfig>,
    #[serde(default)]
    edits: Vec<Edit>,
}

fn default_confirm() -> bool {
    true
}

#[derive(Clone, Debug, Deserialize, Serialize)]
struct TetConfig {
    #[serde(default)]
    label: String,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
enum Edit {
    Glue {
        tet: usize,
        face: usize,
        target: String,
        confirm: Option<bool>,
    },
    Unglue {
        tet: usize,
        face: usize,
    },
    Add,
    Delete {
        tets: Vec<usize>,
    },
    Label {
        tet: usize,
        label: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_targets() {
        assert_eq!(parse_target("  ", 2), Ok(Target::Boundary));
        // face 3 (012) onto 1 (103), as shown in the table
        let target = parse_target("1 (103)", 3).unwrap();
        assert_eq!(
            target,
            Target::Face {
                tet: Label::new(1),
                face: 2,
                perm: Perm4::new([1, 0, 3, 2]).unwrap(),
            }
        );
    }

    #[test]
    fn parsed_targets_print_back() {
        for face in 0..4 {
            for text in ["0 (123)", "4 (302)", "12 (210)"] {
                let mut triangulation = Triangulation::new();
                for _ in 0..13 {
                    triangulation.add_tetrahedron();
                }
                let target = parse_target(text, face).unwrap();
                let source = if text.starts_with("0 ") { 5 } else { 0 };
                triangulation
                    .glue(Label::new(source), face, target, |_| true)
                    .unwrap();
                assert_eq!(
                    triangulation.describe_face(Label::new(source), face).unwrap(),
                    text
                );
            }
        }
    }

    #[test]
    fn reject_bad_targets() {
        assert_eq!(
            parse_target("1 023", 0),
            Err(TargetError::Malformed("1 023".to_string()))
        );
        assert_eq!(
            parse_target("x (023)", 0),
            Err(TargetError::BadTetrahedron("x".to_string()))
        );
        for text in ["1 (02)", "1 (004)", "1 (014)", "1 (0123)", "1 (0a2)"] {
            assert_eq!(parse_target(text, 0), Err(TargetError::BadVertices(text.to_string())));
        }
    }

    #[test]
    fn config_edits() {
        let config: Config = toml::from_str(
            r#"
            [[tetrahedra]]
            label = "top"
            [[tetrahedra]]

            [[edits]]
            action = "glue"
            tet = 0
            face = 3
            target = "1 (103)"

            [[edits]]
            action = "label"
            tet = 1
            label = "bottom"

            [[edits]]
            action = "add"

            [[edits]]
            action = "delete"
            tets = [2]
            "#,
        )
        .unwrap();
        assert!(config.confirm_overwrites);
        assert_eq!(config.tetrahedra.len(), 2);

        let mut triangulation = Triangulation::new();
        for tet in &config.tetrahedra {
            let label = triangulation.add_tetrahedron();
            triangulation.set_label(label, &tet.label).unwrap();
        }
        for edit in &config.edits {
            apply(&mut triangulation, edit, true).unwrap();
        }
        assert_eq!(triangulation.size(), 2);
        assert_eq!(triangulation.tetrahedra()[1].label(), "bottom");
        assert_eq!(triangulation.describe_face(Label::new(1), 2).unwrap(), "0 (102)");
    }
}
