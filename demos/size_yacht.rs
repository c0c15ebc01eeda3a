use rigging_core::config::EngineSettings;
use rigging_core::physics::wind_speeds;
use rigging_core::registry::*;
use rigging_core::sails::*;
use rigging_core::types::*;

const YACHT: &str = "demo-sloop";

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("=== Running Rigging Schedule ===\n");

    let mut store = InMemoryStore::new();
    store.put_particulars(
        YACHT,
        YachtParticulars {
            rig: RigGeometry::from_base(
                Length::new::<meter>(12.0),
                Length::new::<meter>(4.0),
                Length::new::<meter>(11.0),
                Length::new::<meter>(3.5),
            )
            .with(RigDimension::SpinI, Length::new::<meter>(13.0)),
            boat_length: Some(Length::new::<foot>(34.0)),
        },
    )?;

    let settings = EngineSettings::default().with_wind_speed(wind_speeds::near_gale());
    let mut service = RiggingService::new(store, settings);

    for sail in ["Mainsail", "Genoa", "SymSpinnaker"] {
        service.add_sail_type(YACHT, sail)?;
    }
    service.add_halyard_with_sheets(YACHT, "Main Halyard", Length::new::<meter>(2.0))?;
    service.add_halyard_with_sheets(YACHT, "Genoa Halyard", Length::new::<meter>(2.0))?;
    service.add_halyard_with_sheets(YACHT, "Spinnaker Halyard", Length::new::<meter>(1.5))?;

    let report = service.generate_all(YACHT)?;

    let s = "-".repeat(50);
    println!("Sails");
    println!("{}", s);
    for (name, sail) in &report.sails.generated {
        println!(
            "{:<14} luff {}  foot {}  area {}",
            name,
            DisplayLength(sail.luff),
            DisplayLength(sail.foot),
            DisplayArea(sail.area())
        );
    }

    println!("\nRopes");
    println!("{}", s);
    for rope in report.ropes.generated.values() {
        println!("{}", rope.summary());
    }

    for failure in &report.ropes.failures {
        println!("FAILED {}: {}", failure.type_name, failure.error);
    }

    println!("\nSchedule (CSV)");
    println!("{}", s);
    write_rope_schedule(std::io::stdout(), &service.ropes(YACHT)?)?;

    Ok(())
}
