//! End-to-end conversion tests over small hand-written meshes.

use std::fs;

use msh_io::{ConvertConfig, convert_to_arrays, convert_to_vtu};

/// One 10-node second-order tetrahedron (type 11) over a 4-node block; the
/// six midside tags are referenced by the element only.
const ONE_TET: &str = r#"$MeshFormat
4.1 0 8
$EndMeshFormat
$Nodes
1 4 1 4
3 1 0 4
1
2
3
4
0 0 0
1 0 0
0 1 0
0 0 1
$EndNodes
$Elements
1 1 1 1
3 1 11 1
1 1 2 3 4 5 6 7 8 9 10
$EndElements
"#;

const ONE_HEX: &str = r#"$MeshFormat
4.1 0 8
$EndMeshFormat
$Nodes
1 8 1 8
3 1 0 8
1
2
3
4
5
6
7
8
0 0 0
1 0 0
1 1 0
0 1 0
0 0 1
1 0 1
1 1 1
0 1 1
$EndNodes
$Elements
1 1 1 1
3 1 5 1
1 1 2 3 4 5 6 7 8
$EndElements
"#;

#[test]
fn one_tet_converts_to_solver_arrays() {
    let dir = tempfile::tempdir().expect("temp dir should create");
    let input = dir.path().join("gmsh_oneTetTest.msh");
    fs::write(&input, ONE_TET).expect("mesh should write");

    let config = ConvertConfig {
        input: input.clone(),
        out_dir: dir.path().join("out"),
        element_type: 11,
        cell_type: "hexahedron".to_string(),
    };
    let result = convert_to_arrays(&config).expect("conversion should succeed");

    assert!(result.paths.nodes_path.ends_with("oneTetTest_cvtMSH.nodes"));
    assert!(result.paths.elements_path.ends_with("oneTetTest_cvtMSH.ele"));

    let arrays = &result.arrays;
    assert_eq!(arrays.num_nodes, 4);
    assert_eq!(arrays.num_elements, 1);
    assert_eq!(arrays.connectivity.shape(), (1, 10));
    let row: Vec<u64> = arrays.connectivity.row(0).iter().copied().collect();
    assert_eq!(row, vec![1, 2, 3, 4, 5, 6, 7, 8, 9, 10]);
    assert_eq!(
        arrays.element_indices.iter().copied().collect::<Vec<_>>(),
        vec![1]
    );
}

#[test]
fn round_trip_preserves_coordinates_exactly() {
    let src = r#"$Nodes
1 4 1 4
3 1 0 4
1
2
3
4
0.1 -2.5e-3 0.30000000000000004
1.0000000001 0 0
0 17.25 -9.875e2
6.02e23 -1e-300 3.141592653589793
$EndNodes
$Elements
1 1 1 1
3 1 4 1
1 1 2 3 4
$EndElements
"#;
    let dir = tempfile::tempdir().expect("temp dir should create");
    let input = dir.path().join("precision.msh");
    fs::write(&input, src).expect("mesh should write");

    let config = ConvertConfig {
        input,
        out_dir: dir.path().to_path_buf(),
        element_type: 4,
        cell_type: "hexahedron".to_string(),
    };
    let arrays = convert_to_arrays(&config)
        .expect("conversion should succeed")
        .arrays;

    assert_eq!(arrays.node_coords[(0, 0)], 0.1);
    assert_eq!(arrays.node_coords[(0, 1)], -2.5e-3);
    assert_eq!(arrays.node_coords[(0, 2)], 0.30000000000000004);
    assert_eq!(arrays.node_coords[(1, 0)], 1.0000000001);
    assert_eq!(arrays.node_coords[(2, 2)], -9.875e2);
    assert_eq!(arrays.node_coords[(3, 0)], 6.02e23);
    assert_eq!(arrays.node_coords[(3, 1)], -1e-300);
    assert_eq!(arrays.node_coords[(3, 2)], 3.141592653589793);
}

#[test]
fn one_hex_converts_to_vtu() {
    let dir = tempfile::tempdir().expect("temp dir should create");
    let input = dir.path().join("box.msh");
    let output = dir.path().join("box.vtu");
    fs::write(&input, ONE_HEX).expect("mesh should write");

    convert_to_vtu(&input, &output, "hexahedron").expect("conversion should succeed");

    let xml = fs::read_to_string(&output).expect("vtu should be readable");
    assert!(xml.contains("UnstructuredGrid"));
    assert!(xml.contains("NumberOfPoints=\"8\""));
    assert!(xml.contains("NumberOfCells=\"1\""));
}

#[test]
fn vtu_conversion_rejects_unknown_cell_type() {
    let dir = tempfile::tempdir().expect("temp dir should create");
    let input = dir.path().join("box.msh");
    fs::write(&input, ONE_HEX).expect("mesh should write");

    let err = convert_to_vtu(&input, &dir.path().join("box.vtu"), "icosahedron")
        .expect_err("should fail");
    assert!(err.to_string().contains("unsupported output cell type"));
}

#[test]
fn config_file_drives_the_table_conversion() {
    let dir = tempfile::tempdir().expect("temp dir should create");
    let input = dir.path().join("gmsh_oneTetTest.msh");
    fs::write(&input, ONE_TET).expect("mesh should write");

    let config_path = dir.path().join("convert.json");
    fs::write(
        &config_path,
        format!(
            r#"{{"input":{:?},"out_dir":{:?},"element_type":11}}"#,
            input,
            dir.path().join("out")
        ),
    )
    .expect("config should write");

    let config = ConvertConfig::from_json_file(&config_path).expect("config should load");
    assert_eq!(config.cell_type, "hexahedron");

    let result = convert_to_arrays(&config).expect("conversion should succeed");
    assert!(result.paths.nodes_path.exists());
    assert!(result.paths.elements_path.exists());
}
