use crate::unit::UnitRef;
use std::io::Write;

const INDENT: &str = "               ";

pub fn write_help(out: &mut dyn Write, catalog: &[UnitRef]) -> std::io::Result<()> {
  writeln!(out, "The following arguments are supported.")?;
  writeln!(out)?;
  writeln!(out, "  install      Install the service.")?;
  writeln!(out, "  uninstall    Uninstall the service.")?;
  writeln!(out, "  start        Start the service.")?;
  writeln!(out, "  stop         Stop the service.")?;
  writeln!(out, "  service      Run the service.")?;
  writeln!(out, "  <guid>       Run the unit as a foreground application.")?;
  writeln!(out, "{INDENT}Separate multiple guids with a comma or semicolon.")?;
  writeln!(out, "{INDENT}{} unit(s) found.", catalog.len())?;
  for unit in catalog {
    writeln!(out, "{INDENT}{}   {}", unit.id(), unit.name())?;
  }
  out.flush()
}
