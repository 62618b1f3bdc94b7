use larder::{Engine, LineSection, Restriction};

fn render_text(sections: &[LineSection]) -> String {
    let mut out = String::new();
    for section in sections {
        if let Some(label) = &section.section_label {
            out.push_str(&format!("## {}\n", label));
        }
        for line in &section.lines {
            out.push_str(&format!("- {}\n", line.annotated()));
        }
    }
    out
}

#[test]
fn test_double_batch_gluten_free() {
    let mut engine = Engine::new();
    engine
        .add_recipe_json(include_str!("fixtures/pancakes.json"), "pancakes.json")
        .unwrap();

    let mut state = engine.new_session("pancakes").unwrap();
    state.multiplier = 2.0;
    state.set_restriction(Restriction::GlutenFree, true);
    let rendered = engine.render("pancakes", &mut state).unwrap();

    insta::assert_snapshot!(render_text(&rendered.ingredients), @r###"
    ## Dry
    - 3 cups gluten-free flour blend
    - 4 tbsp sugar
    - 4 tsp baking powder + 1 tsp salt
    ## Wet
    - 2 1/2 cups milk (or oat milk)
    - 2 eggs (or egg yolk / flax egg)
    - 2 tbsp water
    - 6 tbsp melted butter
    "###);

    insta::assert_snapshot!(render_text(&rendered.steps), @r###"
    ## Mix
    - Whisk the gluten-free flour blend with the sugar, baking powder and salt.
    - Beat the egg into the milk, then stir in the melted butter.
    ## Cook
    - Cook on a hot griddle until golden. Serve with {syrup}.
    "###);
}
