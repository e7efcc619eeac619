//! Shared test fixtures for E2E CLI tests.
#![allow(dead_code)] // Not every test binary uses every fixture

use rust_xlsxwriter::{Color, Format, Workbook};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;

/// Worksheet the legend fixtures are written to.
pub const LEGEND_SHEET: &str = "ModelView";

/// Fill of one legend row.
#[derive(Debug, Clone, Copy)]
pub enum LegendFill {
    /// No fill at all
    None,
    /// Solid RGB fill, e.g. `0x0000FF`
    Rgb(u32),
    /// Theme color fill (unresolvable)
    Theme(u8),
}

/// Path to the ifc-colorize binary
pub fn colorize_bin() -> String {
    std::env::var("CARGO_BIN_EXE_ifc-colorize")
        .unwrap_or_else(|_| "target/release/ifc-colorize".to_string())
}

/// Creates a Command with an isolated config directory for testing.
///
/// Keeps tests independent of the developer's own configuration.
pub fn isolated_command(args: &[&str], config_dir: &Path) -> Command {
    let mut cmd = Command::new(colorize_bin());
    cmd.env("IFC_COLORIZE_CONFIG_DIR", config_dir);
    cmd.args(args);
    cmd
}

/// Writes a legend workbook with a title in A1, the header row at row 3
/// (`System Type` in B3, `Color` in C3) and one data row per entry.
///
/// # Arguments
/// * `path` - Destination `.xlsx` file
/// * `rows` - `(name, fill)` pairs written from row 4 downwards
pub fn write_legend_workbook(path: &Path, rows: &[(&str, LegendFill)]) {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name(LEGEND_SHEET).unwrap();

    worksheet.write_string(0, 0, "Mechanical Legend").unwrap();
    worksheet.write_string(2, 1, "System Type").unwrap();
    worksheet.write_string(2, 2, "Color").unwrap();

    for (offset, (name, fill)) in rows.iter().enumerate() {
        let row = 3 + offset as u32;
        worksheet.write_string(row, 1, *name).unwrap();
        let format = match fill {
            LegendFill::None => continue,
            LegendFill::Rgb(rgb) => Format::new().set_background_color(Color::RGB(*rgb)),
            LegendFill::Theme(theme) => {
                Format::new().set_background_color(Color::Theme(*theme, 0))
            }
        };
        worksheet.write_blank(row, 2, &format).unwrap();
    }

    workbook.save(path).unwrap();
}

/// Writes a workbook whose legend sheet has no `Color` header.
pub fn write_workbook_without_header(path: &Path) {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name(LEGEND_SHEET).unwrap();
    worksheet.write_string(0, 0, "System Type").unwrap();
    worksheet.write_string(1, 0, "Chilled Water").unwrap();
    workbook.save(path).unwrap();
}

/// The standard legend: chilled water blue, hot water red, and an entry
/// without a fill that the loader skips.
pub fn standard_legend() -> Vec<(&'static str, LegendFill)> {
    vec![
        ("Chilled Water", LegendFill::Rgb(0x00_00FF)),
        ("Hot Water", LegendFill::Rgb(0xFF_0000)),
        ("Domestic Water", LegendFill::None),
    ]
}

/// A small mechanical plant model.
///
/// Objects in spatial order and how a default run treats them:
/// - `#2` storey "Level 1": name mismatch
/// - `#100` pump, Chilled Water: styled
/// - `#110` pump, " chilled water ": styled with the same style
/// - `#120` air handler, Hot Water, axis geometry only: no body
/// - `#130` duct, Condensate: no color
/// - `#140` valve "Valve:12345", Chilled Water: name mismatch
/// - `#150` sensor without the Mechanical set: no classification
pub const PLANT_IFC: &str = "ISO-10303-21;
HEADER;
FILE_DESCRIPTION(('ViewDefinition [CoordinationView]'),'2;1');
FILE_NAME('plant.ifc','2024-05-01T08:00:00',('Engineer'),('Office'),'Exporter','Exporter','');
FILE_SCHEMA(('IFC4'));
ENDSEC;
DATA;
#1=IFCPROJECT('0001',$,'Plant',$,$,$,$,(#5),$);
#2=IFCBUILDINGSTOREY('0002',$,'Level 1',$,$,$,$,$,.ELEMENT.,0.);
#3=IFCRELAGGREGATES('0003',$,$,$,#1,(#2));
#5=IFCGEOMETRICREPRESENTATIONCONTEXT($,'Model',3,1.E-05,$,$);
#100=IFCPUMP('0100',$,'Pump:1234567',$,$,$,#101,$,.NOTDEFINED.);
#101=IFCPRODUCTDEFINITIONSHAPE($,$,(#102));
#102=IFCSHAPEREPRESENTATION(#5,'Body','SweptSolid',(#103));
#103=IFCEXTRUDEDAREASOLID($,$,$,1.);
#110=IFCPUMP('0110',$,'Pump:2345678',$,$,$,#111,$,.NOTDEFINED.);
#111=IFCPRODUCTDEFINITIONSHAPE($,$,(#112));
#112=IFCSHAPEREPRESENTATION(#5,'Body','SweptSolid',(#113));
#113=IFCEXTRUDEDAREASOLID($,$,$,1.);
#120=IFCUNITARYEQUIPMENT('0120',$,'AHU:3456789',$,$,$,#121,$,.AIRHANDLER.);
#121=IFCPRODUCTDEFINITIONSHAPE($,$,(#122));
#122=IFCSHAPEREPRESENTATION(#5,'Axis','Curve3D',(#123));
#123=IFCPOLYLINE(());
#130=IFCDUCTSEGMENT('0130',$,'Duct:4567890',$,$,$,#131,$,.RIGIDSEGMENT.);
#131=IFCPRODUCTDEFINITIONSHAPE($,$,(#132));
#132=IFCSHAPEREPRESENTATION(#5,'Body','SweptSolid',(#133));
#133=IFCEXTRUDEDAREASOLID($,$,$,2.);
#140=IFCVALVE('0140',$,'Valve:12345',$,$,$,#141,$,.ISOLATING.);
#141=IFCPRODUCTDEFINITIONSHAPE($,$,(#142));
#142=IFCSHAPEREPRESENTATION(#5,'Body','SweptSolid',(#143));
#143=IFCEXTRUDEDAREASOLID($,$,$,0.5);
#150=IFCSENSOR('0150',$,'Sensor:5678901',$,$,$,#151,$,.TEMPERATURESENSOR.);
#151=IFCPRODUCTDEFINITIONSHAPE($,$,(#152));
#152=IFCSHAPEREPRESENTATION(#5,'Body','SweptSolid',(#153));
#153=IFCEXTRUDEDAREASOLID($,$,$,0.1);
#160=IFCRELCONTAINEDINSPATIALSTRUCTURE('0160',$,$,$,(#100,#110,#120,#130,#140,#150),#2);
#200=IFCPROPERTYSINGLEVALUE('System Type',$,IFCLABEL('Chilled Water'),$);
#201=IFCPROPERTYSET('0201',$,'Mechanical',$,(#200));
#202=IFCRELDEFINESBYPROPERTIES('0202',$,$,$,(#100,#140),#201);
#210=IFCPROPERTYSINGLEVALUE('System Type',$,IFCLABEL(' chilled water '),$);
#211=IFCPROPERTYSET('0211',$,'Mechanical',$,(#210));
#212=IFCRELDEFINESBYPROPERTIES('0212',$,$,$,(#110),#211);
#220=IFCPROPERTYSINGLEVALUE('System Type',$,IFCLABEL('Hot Water'),$);
#221=IFCPROPERTYSET('0221',$,'Mechanical',$,(#220));
#222=IFCRELDEFINESBYPROPERTIES('0222',$,$,$,(#120),#221);
#230=IFCPROPERTYSINGLEVALUE('System Type',$,IFCLABEL('Condensate'),$);
#231=IFCPROPERTYSET('0231',$,'Mechanical',$,(#230));
#232=IFCRELDEFINESBYPROPERTIES('0232',$,$,$,(#130),#231);
#240=IFCPROPERTYSINGLEVALUE('Accuracy',$,IFCREAL(0.5),$);
#241=IFCPROPERTYSET('0241',$,'Pset_Sensor',$,(#240));
#242=IFCRELDEFINESBYPROPERTIES('0242',$,$,$,(#150),#241);
ENDSEC;
END-ISO-10303-21;
";

/// Writes `contents` to `name` inside `dir` and returns the path.
pub fn write_temp_file(dir: &Path, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, contents).unwrap();
    path
}

/// A temp directory holding `plant.ifc` and the standard `legend.xlsx`.
///
/// # Returns
/// `(dir, ifc_path, workbook_path)`
pub fn plant_workspace() -> (TempDir, PathBuf, PathBuf) {
    let dir = TempDir::new().unwrap();
    let ifc = write_temp_file(dir.path(), "plant.ifc", PLANT_IFC);
    let workbook = dir.path().join("legend.xlsx");
    write_legend_workbook(&workbook, &standard_legend());
    (dir, ifc, workbook)
}

/// Converts a path to `&str` for command arguments.
pub fn arg(path: &Path) -> &str {
    path.to_str().unwrap()
}
