use options_tree::{
    ArrayConfig, DynamicFn, Element, FormatterConfig, OptionsArray, OptionsDict, OptionsNode,
    StrOptions, TreeElement, TreeFormatter,
};

fn reynolds(d: &OptionsDict) -> options_tree::Result<options_tree::Value> {
    let diameter = d.get_f64("diameter")? / 1000.0;
    Ok((d.get_f64("density")? * d.get_f64("velocity")? * diameter / d.get_f64("viscosity")?).into())
}

fn main() -> miette::Result<()> {
    env_logger::Builder::new()
        .filter_level(log::LevelFilter::Warn)
        .parse_default_env()
        .init();

    let mut physics = OptionsDict::new();
    physics.register(DynamicFn::new("reynolds", reynolds));
    physics.insert_dynamic("regime", |d| {
        Ok(if d.get_f64("reynolds")? < 2300.0 { "laminar" } else { "turbulent" }.into())
    });

    let fluids = OptionsArray::new(
        "fluid",
        [
            Element::named("water", [("density", 1000.0), ("viscosity", 1.0e-3)]),
            Element::named("oil", [("density", 900.0), ("viscosity", 0.1)]),
        ],
    )?;
    let diameters = OptionsArray::with_config(
        "diameter",
        [10, 50],
        &ArrayConfig::default().with_name_format("{}mm")?,
    )?;
    let velocities = OptionsArray::new("velocity", [0.1, 1.0])?;

    let tree = OptionsNode::with_dict("pipe", physics)? * fluids * diameters * velocities;
    let config = FormatterConfig::default();
    let branch = StrOptions::default().formatter(TreeFormatter::new(&config));
    let indent = StrOptions::default().formatter(TreeFormatter::new(&config).only_indent(true));

    for mut leaf in tree.collapse() {
        leaf.freeze()?;
        println!("{}", leaf.str_with(&branch)?);
        println!(
            "{}Re = {:.0} ({})",
            leaf.str_with(&indent)?,
            leaf.get_f64("reynolds")?,
            leaf.get_str("regime")?
        );
    }

    Ok(())
}
