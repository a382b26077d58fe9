use std::{
    fs::File,
    io::{self, BufWriter},
    path::{Path, PathBuf},
    process::ExitCode,
};

use avm_arch::{Class, Machine, Segment};
use avmc::{compile_source, error::Error, msg::Msg, object, util, Compiler, SymbolMap};

const HELP_TEMPLATE: &str = "\
{before-help}{bin} {version}
  {about}

{usage-heading}
{tab}{usage}

{all-args}{after-help}";

#[derive(Debug, clap::Parser)]
#[clap(version, about, help_template = HELP_TEMPLATE)]
struct Args {
    /// Input files, one segment each
    #[clap(required = true)]
    input: Vec<String>,

    /// Directory to write `<stem>.avmo` objects into
    #[clap(short, long)]
    out_dir: Option<PathBuf>,

    /// Write a YAML symbol map per segment
    #[clap(short, long)]
    map: bool,

    /// Dump compiled segments
    #[clap(short, long)]
    dump: bool,
}

fn main() -> ExitCode {
    use clap::Parser;

    let args: Args = Args::parse();
    let mut machine = Machine::new("avm");
    let mut failed = false;

    for path in &args.input {
        match compile_file(path) {
            Ok((segment, clean)) => {
                failed |= !clean;
                // Emit after placement so objects carry the assigned id.
                let placed = match machine.add_segment(segment) {
                    Ok(_) => machine.segments().as_slice().last(),
                    Err(err) => {
                        Msg::Error(Error::from(err).to_string()).print();
                        failed = true;
                        None
                    }
                };
                if let Some(Err(err)) = placed.map(|segment| emit(&args, segment)) {
                    Msg::Error(err.to_string()).print();
                    failed = true;
                }
            }
            Err(err) => {
                Msg::Error(err.to_string()).print();
                failed = true;
            }
        }
    }

    if args.dump {
        util::print_machine(&machine);
    }

    match failed {
        true => ExitCode::FAILURE,
        false => ExitCode::SUCCESS,
    }
}

/// Compiles one file into its own segment. The flag is false when any line
/// failed.
fn compile_file(path: &str) -> Result<(Segment, bool), Error> {
    println!("PARSING: {}", path);
    let source = std::fs::read_to_string(path).map_err(|e| Error::FileOpen(path.to_string(), e))?;

    let mut compiler = Compiler::new(Segment::new(&stem(path)), io::stdout());
    let diags = compile_source(&mut compiler, path, &source);
    for diag in &diags {
        Msg::Error(diag.error.to_string()).diag(diag.info());
    }

    let segment = compiler.into_segment();
    for symbol in segment.symbols() {
        if symbol.entity.class() == Class::Unresolved {
            Msg::Note(format!("`{}` is left for the linker", symbol.name)).print();
        }
    }
    Ok((segment, diags.is_empty()))
}

fn emit(args: &Args, segment: &Segment) -> Result<(), Error> {
    let stem = segment.name();
    if let Some(dir) = &args.out_dir {
        let path = dir.join(format!("{stem}.avmo"));
        let name = path.display().to_string();
        let file = File::create(&path).map_err(|e| Error::FileCreate(name.clone(), e))?;
        object::write(segment, BufWriter::new(file)).map_err(|e| Error::FileWrite(name, e))?;
    }

    if args.map {
        let yaml = SymbolMap::generate(segment).to_yaml()?;
        match &args.out_dir {
            Some(dir) => {
                let path = dir.join(format!("{stem}.map.yaml"));
                let name = path.display().to_string();
                std::fs::write(&path, yaml).map_err(|e| Error::FileWrite(name, e))?;
            }
            None => print!("{}", yaml),
        }
    }
    Ok(())
}

fn stem(path: &str) -> String {
    Path::new(path)
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string())
}
