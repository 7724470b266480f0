/*
 * Copyright (c) Microsoft Corporation.
 * Licensed under the MIT license.
 */

use layout_benchmark::{output, utils::tracing::init_subscriber, App, Output};

pub fn main() -> anyhow::Result<()> {
    init_subscriber();
    let app = App::parse();
    main_inner(&app, &mut output::default())
}

fn main_inner(app: &App, output: &mut dyn Output) -> anyhow::Result<()> {
    app.run(output)
}

///////////
// Tests //
///////////
