use lpex_solver::{Bounds, ModelError, Program, SampleSpec, VarKind};

/// Plot range for one variable.
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AxisWindow {
    pub variable: &'static str,
    pub min: f64,
    pub max: f64,
}

const fn axis(variable: &'static str, min: f64, max: f64) -> AxisWindow {
    AxisWindow { variable, min, max }
}

/// A named word problem.
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[derive(Debug, Clone, Copy)]
pub struct Exercise {
    pub key: &'static str,
    pub title: &'static str,
    #[cfg_attr(feature = "serde", serde(skip))]
    pub build: fn() -> Result<Program, ModelError>,
    /// Two or three axes covering the interesting part of the region
    pub window: &'static [AxisWindow],
}

impl Exercise {
    pub fn program(&self) -> Result<Program, ModelError> {
        (self.build)()
    }

    /// Sampling request over this exercise's window. Variable bounds are
    /// applied so bounded exercises plot the same region the solver sees.
    pub fn sample_spec(&self, program: &Program, resolution: usize) -> Result<SampleSpec, ModelError> {
        let mut spec = SampleSpec::new(resolution).respect_bounds(true);
        for window in self.window {
            let variable = program
                .variable(window.variable)
                .ok_or_else(|| ModelError::UnknownVariable {
                    name: window.variable.to_string(),
                })?;
            spec = spec.axis(variable, window.min, window.max);
        }
        Ok(spec)
    }
}

static CATALOG: [Exercise; 22] = [
    Exercise {
        key: "production",
        title: "Two products sharing production time",
        build: production,
        window: &[axis("x1", 0.0, 60.0), axis("x2", 0.0, 40.0)],
    },
    Exercise {
        key: "engineering-teams",
        title: "Allocating engineers and technicians to three team types",
        build: engineering_teams,
        window: &[axis("x1", 0.0, 7.0), axis("x2", 0.0, 6.0), axis("x3", 0.0, 5.0)],
    },
    Exercise {
        key: "fuel-blend",
        title: "Three fuels from mineral extract and solvent",
        build: fuel_blend,
        window: &[axis("a", 0.0, 15.0), axis("b", 0.0, 24.0), axis("c", 0.0, 30.0)],
    },
    Exercise {
        key: "forge",
        title: "Forge, polish and raw material hours",
        build: forge,
        window: &[axis("p1", 0.0, 6.0), axis("p2", 0.0, 4.0)],
    },
    Exercise {
        key: "bus-fleet",
        title: "Cheapest fleet of large and small buses",
        build: bus_fleet,
        window: &[axis("large", 0.0, 10.0), axis("small", 0.0, 14.0)],
    },
    Exercise {
        key: "paper-mill",
        title: "Running two paper mills to meet grade orders",
        build: paper_mill,
        window: &[axis("mill1_days", 0.0, 15.0), axis("mill2_days", 0.0, 10.0)],
    },
    Exercise {
        key: "factory-plan",
        title: "Two products with capacity and demand limits",
        build: factory_plan,
        window: &[axis("x1", 0.0, 6.0), axis("x2", 0.0, 9.0)],
    },
    Exercise {
        key: "tailor",
        title: "Suits and dresses from cotton, silk and wool",
        build: tailor,
        window: &[axis("suits", 0.0, 10.0), axis("dresses", 0.0, 8.0)],
    },
    Exercise {
        key: "cookware",
        title: "Pans and skillets sharing molding time",
        build: cookware,
        window: &[axis("pans", 0.0, 6.0), axis("skillets", 0.0, 6.0)],
    },
    Exercise {
        key: "energy-drink",
        title: "Cheapest blend inside a caffeine band",
        build: energy_drink,
        window: &[axis("red", 0.0, 14.0), axis("blue", 0.0, 12.0)],
    },
    Exercise {
        key: "tv-schedule",
        title: "Advert and music minutes for the largest audience",
        build: tv_schedule,
        window: &[axis("program_a", 0.0, 6.0), axis("program_b", 0.0, 9.0)],
    },
    Exercise {
        key: "shoemaker",
        title: "Shoes and belts per hour of leather work",
        build: shoemaker,
        window: &[axis("shoes", 0.0, 5.0), axis("belts", 0.0, 6.0)],
    },
    Exercise {
        key: "metalworks",
        title: "Three components from one hour of production",
        build: metalworks,
        window: &[axis("a", 0.0, 20.0), axis("b", 0.0, 30.0), axis("c", 0.0, 40.0)],
    },
    Exercise {
        key: "refinery",
        title: "Green, blue and regular gasoline from three inputs",
        build: refinery,
        window: &[
            axis("green", 0.0, 8_000_000.0),
            axis("blue", 0.0, 600_000.0),
            axis("regular", 0.0, 13_000_000.0),
        ],
    },
    Exercise {
        key: "knives",
        title: "Standard, medium and large knives through five machines",
        build: knives,
        window: &[axis("standard", 0.0, 3000.0), axis("medium", 0.0, 3000.0), axis("large", 0.0, 3000.0)],
    },
    Exercise {
        key: "soft-drinks",
        title: "Two soft drinks with a cap on the first",
        build: soft_drinks,
        window: &[axis("x1", 0.0, 4.0), axis("x2", 0.0, 8.0)],
    },
    Exercise {
        key: "training-sessions",
        title: "Most swimming and cycling sessions on a budget",
        build: training_sessions,
        window: &[axis("swimming", 0.0, 10.0), axis("cycling", 0.0, 10.0)],
    },
    Exercise {
        key: "machine-hours",
        title: "Two products from machine hours and raw material",
        build: machine_hours,
        window: &[axis("product1", 0.0, 100.0), axis("product2", 0.0, 75.0)],
    },
    Exercise {
        key: "shirts",
        title: "Long and short sleeve shirts sharing labour",
        build: shirts,
        window: &[axis("long_sleeve", 0.0, 160.0), axis("short_sleeve", 0.0, 400.0)],
    },
    Exercise {
        key: "parachutes",
        title: "Parachutes and hang gliders on two assembly lines",
        build: parachutes,
        window: &[axis("parachutes", 0.0, 15.0), axis("hang_gliders", 0.0, 10.0)],
    },
    Exercise {
        key: "sheet-mills",
        title: "Days at two sheet mills to meet a contract",
        build: sheet_mills,
        window: &[axis("sp_days", 0.0, 10.0), axis("rj_days", 0.0, 10.0)],
    },
    Exercise {
        key: "shoemaker-capacity",
        title: "Shoes and belts under leather and hourly capacity",
        build: shoemaker_capacity,
        window: &[axis("shoes", 0.0, 6.0), axis("belts", 0.0, 6.0)],
    },
];

/// Every exercise, in catalogue order.
pub fn catalog() -> &'static [Exercise] {
    &CATALOG
}

pub fn find(key: &str) -> Option<&'static Exercise> {
    CATALOG.iter().find(|e| e.key == key)
}

fn production() -> Result<Program, ModelError> {
    let mut p = Program::new("production");
    let x1 = p.continuous("x1")?;
    let x2 = p.continuous("x2")?;
    p.maximize(1000.0 * &x1 + 1800.0 * &x2)?;
    p.le("time", 20.0 * &x1 + 30.0 * &x2, 1200.0)?;
    p.le("demand_p1", &x1, 40.0)?;
    p.le("demand_p2", &x2, 30.0)?;
    Ok(p)
}

fn engineering_teams() -> Result<Program, ModelError> {
    let mut p = Program::new("engineering-teams");
    let x1 = p.continuous("x1")?;
    let x2 = p.continuous("x2")?;
    let x3 = p.continuous("x3")?;
    p.maximize(2000.0 * &x1 + 3000.0 * &x2 + 2800.0 * &x3)?;
    p.le("engineers", 2.0 * &x1 + 4.0 * &x2 + 3.0 * &x3, 25.0)?;
    p.le("technicians", 6.0 * &x1 + 8.0 * &x2 + 9.0 * &x3, 40.0)?;
    Ok(p)
}

fn fuel_blend() -> Result<Program, ModelError> {
    let mut p = Program::new("fuel-blend");
    let a = p.continuous("a")?;
    let b = p.continuous("b")?;
    let c = p.continuous("c")?;
    p.maximize(20.0 * &a + 22.0 * &b + 18.0 * &c)?;
    p.le("mineral_extract", 8.0 * &a + 5.0 * &b + 4.0 * &c, 120.0)?;
    p.le("solvent", 5.0 * &a + 4.0 * &b + 2.0 * &c, 200.0)?;
    Ok(p)
}

fn forge() -> Result<Program, ModelError> {
    let mut p = Program::new("forge");
    let p1 = p.continuous("p1")?;
    let p2 = p.continuous("p2")?;
    p.maximize(1900.0 * &p1 + 2100.0 * &p2)?;
    p.le("forge_hours", 4.0 * &p1 + 2.0 * &p2, 20.0)?;
    p.le("polish_hours", 2.0 * &p1 + 3.0 * &p2, 10.0)?;
    p.le("raw_material", 100.0 * &p1 + 200.0 * &p2, 500.0)?;
    Ok(p)
}

fn bus_fleet() -> Result<Program, ModelError> {
    let mut p = Program::new("bus-fleet");
    let large = p.integer("large")?;
    let small = p.integer("small")?;
    p.minimize(190.0 * &large + 140.0 * &small)?;
    p.ge("capacity", 60.0 * &large + 40.0 * &small, 600.0)?;
    p.le("max_large", &large, 8.0)?;
    p.le("max_small", &small, 12.0)?;
    p.le("drivers", &large + &small, 13.0)?;
    Ok(p)
}

fn paper_mill() -> Result<Program, ModelError> {
    let mut p = Program::new("paper-mill");
    let m1 = p.continuous("mill1_days")?;
    let m2 = p.continuous("mill2_days")?;
    p.minimize(1000.0 * &m1 + 2000.0 * &m2)?;
    p.ge("fine", 8.0 * &m1 + 2.0 * &m2, 16.0)?;
    p.ge("medium", &m1 + &m2, 6.0)?;
    p.ge("coarse", 2.0 * &m1 + 7.0 * &m2, 28.0)?;
    Ok(p)
}

fn factory_plan() -> Result<Program, ModelError> {
    let mut p = Program::new("factory-plan");
    let x1 = p.continuous("x1")?;
    let x2 = p.continuous("x2")?;
    p.maximize(3.0 * &x1 + 5.0 * &x2)?;
    p.le("plant1", &x1, 4.0)?;
    p.le("plant2", &x2, 6.0)?;
    p.le("plant3", 3.0 * &x1 + 2.0 * &x2, 18.0)?;
    Ok(p)
}

fn tailor() -> Result<Program, ModelError> {
    let mut p = Program::new("tailor");
    let suits = p.continuous("suits")?;
    let dresses = p.continuous("dresses")?;
    p.maximize(300.0 * &suits + 500.0 * &dresses)?;
    p.le("cotton", 2.0 * &suits + &dresses, 16.0)?;
    p.le("silk", &suits + 2.0 * &dresses, 11.0)?;
    p.le("wool", &suits + 3.0 * &dresses, 15.0)?;
    Ok(p)
}

// market demand is expressed as variable bounds rather than rows
fn cookware() -> Result<Program, ModelError> {
    let mut p = Program::new("cookware");
    let pans = p.add_variable("pans", Bounds::at_most(4.0), VarKind::Continuous)?;
    let skillets = p.add_variable("skillets", Bounds::at_most(4.0), VarKind::Continuous)?;
    p.maximize(3.0 * &pans + 4.0 * &skillets)?;
    p.le("molding_hours", &pans + &skillets, 6.0)?;
    Ok(p)
}

fn energy_drink() -> Result<Program, ModelError> {
    let mut p = Program::new("energy-drink");
    let red = p.continuous("red")?;
    let blue = p.continuous("blue")?;
    p.minimize(0.06 * &red + 0.08 * &blue)?;
    p.ge("guarana", 8.0 * &red + 6.0 * &blue, 48.0)?;
    p.ge("caffeine_min", &red + 2.0 * &blue, 12.0)?;
    p.le("caffeine_max", &red + 2.0 * &blue, 20.0)?;
    Ok(p)
}

fn tv_schedule() -> Result<Program, ModelError> {
    let mut p = Program::new("tv-schedule");
    let a = p.continuous("program_a")?;
    let b = p.continuous("program_b")?;
    p.maximize(30000.0 * &a + 10000.0 * &b)?;
    p.ge("adverts", &a + &b, 5.0)?;
    p.le("music", 2.0 * &a + &b, 8.0)?;
    Ok(p)
}

fn shoemaker() -> Result<Program, ModelError> {
    let mut p = Program::new("shoemaker");
    let shoes = p.continuous("shoes")?;
    let belts = p.continuous("belts")?;
    p.maximize(5.0 * &shoes + 2.0 * &belts)?;
    p.le("time", (1.0 / 6.0) * &shoes + (1.0 / 5.0) * &belts, 1.0)?;
    p.le("leather", 2.0 * &shoes + &belts, 6.0)?;
    Ok(p)
}

fn metalworks() -> Result<Program, ModelError> {
    let mut p = Program::new("metalworks");
    let a = p.continuous("a")?;
    let b = p.continuous("b")?;
    let c = p.continuous("c")?;
    p.maximize(25.0 * &a + 15.0 * &b + 11.0 * &c)?;
    // fraction of the hour each component would take on its own
    p.le("hour", (1.0 / 25.0) * &a + (1.0 / 30.0) * &b + (1.0 / 40.0) * &c, 1.0)?;
    p.le("resource_1", 40.0 * &a + 25.0 * &b + 18.0 * &c, 712.0)?;
    p.le("resource_2", 30.0 * &a + 15.0 * &b + 10.0 * &c, 450.0)?;
    Ok(p)
}

fn refinery() -> Result<Program, ModelError> {
    let mut p = Program::new("refinery");
    let green = p.continuous("green")?;
    let blue = p.continuous("blue")?;
    let regular = p.continuous("regular")?;
    p.maximize(0.30 * &green + 0.25 * &blue + 0.20 * &regular)?;
    p.le("pure_gasoline", 0.22 * &green + 0.52 * &blue + 0.74 * &regular, 9_600_000.0)?;
    p.le("octane", 0.50 * &green + 0.34 * &blue + 0.20 * &regular, 4_800_000.0)?;
    p.le("additive", 0.28 * &green + 0.14 * &blue + 0.06 * &regular, 2_200_000.0)?;
    p.ge("regular_over_green", &regular - 16.0 * &green, 0.0)?;
    p.le("blue_demand", &blue, 600_000.0)?;
    Ok(p)
}

// machine times in seconds per knife, sheet metal in square centimetres
fn knives() -> Result<Program, ModelError> {
    let mut p = Program::new("knives");
    let standard = p.continuous("standard")?;
    let medium = p.continuous("medium")?;
    let large = p.continuous("large")?;
    p.maximize(3.0 * &standard + 4.0 * &medium + 4.7 * &large)?;
    p.le("cutting", 10.0 * &standard + 10.0 * &medium + 12.0 * &large, 14_400.0)?;
    p.le("shaping", 10.0 * &standard + 15.5 * &medium + 17.0 * &large, 21_600.0)?;
    p.le("sharpening", 12.0 * &standard + 16.0 * &medium + 19.0 * &large, 21_600.0)?;
    p.le("handle", 19.0 * &standard + 21.0 * &medium + 24.0 * &large, 28_800.0)?;
    p.le("assembly", 19.0 * &standard + 21.0 * &medium + 22.0 * &large, 28_800.0)?;
    p.le("sheet_metal", 25.0 * &standard + 32.0 * &medium + 45.0 * &large, 50_000.0)?;
    Ok(p)
}

fn soft_drinks() -> Result<Program, ModelError> {
    let mut p = Program::new("soft-drinks");
    let x1 = p.add_variable("x1", Bounds::at_most(4.0), VarKind::Continuous)?;
    let x2 = p.continuous("x2")?;
    p.maximize(&x1 + 2.0 * &x2)?;
    p.le("first", 7.0 * &x1 + 9.0 * &x2, 63.0)?;
    p.le("second", 11.0 * &x1 + 5.0 * &x2, 55.0)?;
    Ok(p)
}

fn training_sessions() -> Result<Program, ModelError> {
    let mut p = Program::new("training-sessions");
    let swimming = p.continuous("swimming")?;
    let cycling = p.continuous("cycling")?;
    p.maximize(&swimming + &cycling)?;
    p.le("budget", 3.0 * &swimming + 2.0 * &cycling, 70.0)?;
    p.le("hours", 2.0 * &swimming + 2.0 * &cycling, 18.0)?;
    p.le("calories", 1500.0 * &swimming + 1000.0 * &cycling, 80_000.0)?;
    Ok(p)
}

fn machine_hours() -> Result<Program, ModelError> {
    let mut p = Program::new("machine-hours");
    let x = p.continuous("product1")?;
    let y = p.continuous("product2")?;
    p.maximize(2.0 * &x + 5.0 * &y)?;
    p.le("machine_hours", 3.0 * &x + 4.0 * &y, 200.0)?;
    p.le("raw_material", 9.0 * &x + 7.0 * &y, 300.0)?;
    Ok(p)
}

fn shirts() -> Result<Program, ModelError> {
    let mut p = Program::new("shirts");
    let long = p.continuous("long_sleeve")?;
    let short = p.continuous("short_sleeve")?;
    p.maximize(5.0 * &long + 3.5 * &short)?;
    // labour counted in short-sleeve shirts
    p.le("labour", 1.5 * &long + &short, 400.0)?;
    p.le("long_demand", &long, 150.0)?;
    p.le("short_demand", &short, 300.0)?;
    Ok(p)
}

fn parachutes() -> Result<Program, ModelError> {
    let mut p = Program::new("parachutes");
    let chutes = p.continuous("parachutes")?;
    let gliders = p.continuous("hang_gliders")?;
    p.maximize(60.0 * &chutes + 40.0 * &gliders)?;
    p.le("line1", 10.0 * &chutes + 10.0 * &gliders, 100.0)?;
    p.le("line2", 3.0 * &chutes + 7.0 * &gliders, 42.0)?;
    Ok(p)
}

fn sheet_mills() -> Result<Program, ModelError> {
    let mut p = Program::new("sheet-mills");
    let sp = p.continuous("sp_days")?;
    let rj = p.continuous("rj_days")?;
    p.minimize(100_000.0 * &sp + 200_000.0 * &rj)?;
    p.ge("thin", 8.0 * &sp + 2.0 * &rj, 16.0)?;
    p.ge("medium", &sp + &rj, 6.0)?;
    p.ge("thick", 2.0 * &sp + 7.0 * &rj, 28.0)?;
    Ok(p)
}

fn shoemaker_capacity() -> Result<Program, ModelError> {
    let mut p = Program::new("shoemaker-capacity");
    let shoes = p.continuous("shoes")?;
    let belts = p.continuous("belts")?;
    p.maximize(5.0 * &shoes + 2.0 * &belts)?;
    p.le("leather", 2.0 * &shoes + &belts, 6.0)?;
    p.le("shoe_capacity", &shoes, 6.0)?;
    p.le("belt_capacity", &belts, 5.0)?;
    Ok(p)
}
