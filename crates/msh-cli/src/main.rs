use std::path::Path;
use std::process::ExitCode;

use msh_io::{ConvertConfig, convert_to_arrays, convert_to_vtu};
use msh_model::MeshSummary;
use msh_parse::MshFile;

fn usage() {
    eprintln!("usage: msh-cli vtu <from.msh> <to.vtu>");
    eprintln!("       msh-cli tables <input.msh> <out-dir> <type-code>");
    eprintln!("       msh-cli analyze <input.msh>");
}

fn print_summary(summary: &MeshSummary) {
    println!("node_blocks: {}", summary.num_node_blocks);
    println!("nodes: {}", summary.num_nodes);
    println!("node_tags: {}..{}", summary.min_node_tag, summary.max_node_tag);
    println!("element_blocks: {}", summary.num_element_blocks);
    println!("elements: {}", summary.num_elements);
    println!("dimension: {}", summary.dimension);
    for (label, count) in &summary.type_counts {
        println!("  {label}: {count}");
    }
}

fn timestamp() -> String {
    chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string()
}

fn run_vtu(from: &Path, to: &Path) -> ExitCode {
    if let Err(err) = convert_to_vtu(from, to, "hexahedron") {
        eprintln!("conversion error: {err}");
        return ExitCode::from(1);
    }
    println!("wrote {} at {}", to.display(), timestamp());
    ExitCode::SUCCESS
}

fn run_tables(input: &Path, out_dir: &Path, type_code: i32) -> ExitCode {
    let config = ConvertConfig {
        input: input.to_path_buf(),
        out_dir: out_dir.to_path_buf(),
        element_type: type_code,
        cell_type: "hexahedron".to_string(),
    };

    let result = match convert_to_arrays(&config) {
        Ok(result) => result,
        Err(err) => {
            eprintln!("conversion error: {err}");
            return ExitCode::from(1);
        }
    };

    let arrays = &result.arrays;
    println!("nodes_table: {}", result.paths.nodes_path.display());
    println!("elements_table: {}", result.paths.elements_path.display());
    println!("n_n: {}", arrays.num_nodes);
    println!("n_el: {}", arrays.num_elements);
    let (rows, cols) = arrays.connectivity.shape();
    println!("ele_map: {rows}x{cols}");
    println!("converted at {}", timestamp());
    ExitCode::SUCCESS
}

fn run_analyze(input: &Path) -> ExitCode {
    let msh = match MshFile::parse_file(input) {
        Ok(msh) => msh,
        Err(err) => {
            eprintln!("parse error: {err}");
            return ExitCode::from(1);
        }
    };
    print_summary(&MeshSummary::from_msh(&msh));
    ExitCode::SUCCESS
}

fn main() -> ExitCode {
    let args: Vec<String> = std::env::args().collect();

    match args.get(1).map(String::as_str) {
        Some("vtu") if args.len() == 4 => {
            run_vtu(Path::new(&args[2]), Path::new(&args[3]))
        }
        Some("tables") if args.len() == 5 => {
            let type_code = match args[4].parse::<i32>() {
                Ok(code) => code,
                Err(_) => {
                    eprintln!("invalid type code: {}", args[4]);
                    return ExitCode::from(2);
                }
            };
            run_tables(Path::new(&args[2]), Path::new(&args[3]), type_code)
        }
        Some("analyze") if args.len() == 3 => run_analyze(Path::new(&args[2])),
        _ => {
            usage();
            ExitCode::from(2)
        }
    }
}
