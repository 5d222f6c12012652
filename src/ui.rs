//! User interface rendering functions for all application screens.

use std::rc::Rc;

use color_eyre::eyre::{OptionExt as _, Result};
use ratatui::{
    layout::{Alignment, Constraint, Flex, Layout, Rect},
    style::{Color, Style},
    symbols::Marker,
    text::Line,
    widgets::{
        canvas::{Canvas, Points},
        Block, BorderType, Borders, Clear,
    },
    Frame,
};

use crate::{
    game::{Game, GameStatus},
    grid::{Grid, Position},
    pursuer::Pursuer,
    types::{EndMenuItem, MainMenuItem, MenuType, Screen},
    App,
};

/// Updates the application UI based on the persistent state.
///
/// This function renders different screens based on the current state stored in the [`App`]
/// structure, dispatching to the appropriate rendering function for each screen type.
///
/// # Errors
///
/// This function may return errors from drawing operations or data conversion failures.
pub(crate) fn draw(app: &App, frame: &mut Frame) -> Result<()> {
    match app.screen {
        Screen::MainMenu(item) => main_menu(frame, item),
        Screen::Generating => generating(frame),
        Screen::InGame => in_game(app, frame)?,
        Screen::GameEnd(item) => end_menu(app, frame, item)?,
    }

    Ok(())
}

/// Clears the terminal screen by rendering a [`Clear`] widget.
///
/// This function renders a clear widget over the entire area of the frame to prepare for
/// rendering new content without artifacts from previous buffers rendered on the same frame.
pub(crate) fn clear(frame: &mut Frame) {
    let clear = Clear;
    frame.render_widget(clear, frame.area());
}

/// Renders the generic layout structure for the main and end menus.
///
/// This function creates the common layout and block structure shared by the menus. The generic
/// part includes the centered positioning and border styling, while the specific menu content is
/// handled by the caller using the [`MenuType`] parameter.
#[expect(
    clippy::indexing_slicing,
    reason = "The collection is created in-place with few, known elements; there is no risk of bad indexing."
)]
pub(crate) fn init_menu(frame: &mut Frame, menu: MenuType) -> Rc<[Rect]> {
    let space = Layout::vertical([
        Constraint::Percentage(30),
        Constraint::Percentage(40),
        Constraint::Percentage(30),
    ])
    .split(frame.area())[1];
    let space = Layout::horizontal([
        Constraint::Percentage(35),
        Constraint::Percentage(30),
        Constraint::Percentage(35),
    ])
    .split(space)[1];

    let layout = Layout::vertical([Constraint::Max(u16::from(menu.value() + 2))])
        .flex(Flex::Center)
        .split(space)[0];

    let block = Block::bordered()
        .title(menu.repr())
        .title_bottom("(j) down / (k) up / (l) select")
        .title_alignment(Alignment::Center)
        .style(Color::Green)
        .border_type(BorderType::Rounded);

    let inner_space = block.inner(layout);

    frame.render_widget(block, layout);

    Layout::vertical(vec![Constraint::Max(1); menu.value().into()]).split(inner_space)
}

/// Styles a pair of menu options so that only the selected one stands out.
fn menu_options<'text>(
    first: &'text str,
    second: &'text str,
    first_active: bool,
) -> [Line<'text>; 2] {
    let content_style = Style::default().fg(Color::Green);
    let active_content_style = Style::default().fg(Color::White).bg(Color::Green);

    let (first_style, second_style) = if first_active {
        (active_content_style, content_style)
    } else {
        (content_style, active_content_style)
    };

    [
        Line::raw(first).centered().style(first_style),
        Line::raw(second).centered().style(second_style),
    ]
}

/// Renders the main menu screen with navigation options.
///
/// This function displays the main menu with options for "Start Game" and "Quit". It highlights
/// the currently selected option.
#[expect(
    clippy::indexing_slicing,
    reason = "The collection is created in-place with few, known elements; there is no risk of bad indexing."
)]
#[expect(
    clippy::missing_asserts_for_indexing,
    reason = "The collection is created in-place with few, known elements; there is no risk of bad indexing."
)]
pub(crate) fn main_menu(frame: &mut Frame, item: MainMenuItem) {
    clear(frame);

    let inner_layout = init_menu(frame, MenuType::MainMenu(2));
    let [start, quit] = menu_options("Start Game", "Quit", item == MainMenuItem::StartGame);

    frame.render_widget(start, inner_layout[0]);
    frame.render_widget(quit, inner_layout[1]);
}

/// Renders the notice shown while a maze is being generated.
#[expect(
    clippy::indexing_slicing,
    reason = "The collection is created in-place with a single element."
)]
pub(crate) fn generating(frame: &mut Frame) {
    clear(frame);

    let line = Layout::vertical([Constraint::Length(1)])
        .flex(Flex::Center)
        .split(frame.area())[0];

    frame.render_widget(
        Line::styled("Generating maze...", Color::Green).centered(),
        line,
    );
}

/// Renders the end screen with the final score and the restart option.
///
/// # Errors
///
/// This function may return errors if there is no finished game to report on.
#[expect(
    clippy::indexing_slicing,
    reason = "The collection is created in-place with few, known elements; there is no risk of bad indexing."
)]
#[expect(
    clippy::missing_asserts_for_indexing,
    reason = "The collection is created in-place with few, known elements; there is no risk of bad indexing."
)]
pub(crate) fn end_menu(app: &App, frame: &mut Frame, item: EndMenuItem) -> Result<()> {
    clear(frame);

    let game = app
        .game
        .as_ref()
        .ok_or_eyre("failed to retrieve the finished game")?;
    let menu = if game.status() == GameStatus::Won {
        MenuType::Won(3)
    } else {
        MenuType::Lost(3)
    };

    let inner_layout = init_menu(frame, menu);
    let score = Line::raw(format!("Score: {}", game.player().score()))
        .centered()
        .style(Style::default().fg(Color::Yellow));
    let [restart, quit] = menu_options("Restart", "Quit", item == EndMenuItem::Restart);

    frame.render_widget(score, inner_layout[0]);
    frame.render_widget(restart, inner_layout[1]);
    frame.render_widget(quit, inner_layout[2]);

    Ok(())
}

/// Transforms grid positions into canvas coordinates centered on the origin.
///
/// The canvas y axis grows upwards while grid rows grow downwards, so rows are flipped around the
/// center of the grid.
///
/// # Errors
///
/// This function may return errors if a dimension or coordinate does not fit in a `u16`.
pub(crate) fn transform_maze_to_screen_coords<I: IntoIterator<Item = Position>>(
    positions: I,
    grid: &Grid,
) -> Result<Vec<(f64, f64)>> {
    let rows_n = f64::from(u16::try_from(grid.rows())?);
    let cols_n = f64::from(u16::try_from(grid.cols())?);

    positions
        .into_iter()
        .map(|pos| {
            // Row transformation: coordinate[i] = (n - 1) / 2 - i
            let screen_y = (rows_n - 1.) / 2. - f64::from(u16::try_from(pos.y)?);

            // Column transformation: coordinate[i] = i - (n - 1) / 2
            let screen_x = f64::from(u16::try_from(pos.x)?) - (cols_n - 1.) / 2.;

            Ok((screen_x, screen_y))
        })
        .collect()
}

/// Color a pursuer is drawn with.
///
/// Scared pursuers share one color; a pursuer that has just respawned keeps its own color until
/// the power window ends.
const fn pursuer_color(pursuer: &Pursuer) -> Color {
    if pursuer.appears_scared() {
        return Color::Blue;
    }

    match pursuer.name().as_bytes() {
        [b'B', ..] => Color::Red,
        [b'I', ..] => Color::Cyan,
        [b'P', ..] => Color::Magenta,
        _ => Color::LightRed,
    }
}

/// Builds the status line shown above the maze.
fn hud(app: &App, game: &Game) -> Line<'static> {
    let player = game.player();
    let power = game
        .power_frames_left()
        .div_ceil(u64::from(app.config.fps.max(1)));

    let power = if player.is_powered_up() {
        format!("  Power: {power}s")
    } else {
        String::new()
    };

    Line::styled(
        format!(
            "Score: {}  Lives: {}  Pellets: {}{power}",
            player.score(),
            player.lives(),
            game.maze().pellets().len()
        ),
        Color::Yellow,
    )
    .centered()
}

/// Renders the in-game screen with the maze, the pellets and every actor.
///
/// This function draws the walls, the remaining pellets and the actors on stacked [`Canvas`]
/// widgets sized to the maze, with a status line above and a key reminder below.
///
/// # Errors
///
/// This function may return errors from coordinate conversion operations or if no game is in
/// progress.
#[expect(
    clippy::too_many_lines,
    reason = "UI rendering function requires many lines for layout and drawing operations."
)]
pub(crate) fn in_game(app: &App, frame: &mut Frame) -> Result<()> {
    clear(frame);

    let game = app
        .game
        .as_ref()
        .ok_or_eyre("failed to retrieve the game in progress")?;
    let grid = game.maze().grid();
    let maze_rows = u16::try_from(grid.rows())?;
    let maze_columns = u16::try_from(grid.cols())?;

    // Status line + maze area + tooltip at bottom
    let overall_layout = Layout::vertical([
        Constraint::Length(1),
        Constraint::Min(1),
        Constraint::Length(3),
    ])
    .split(frame.area());

    let hud_area = *overall_layout
        .first()
        .ok_or_eyre("failed to get status area from layout")?;
    let maze_content_area = *overall_layout
        .get(1)
        .ok_or_eyre("failed to get maze content area from layout")?;
    let tooltip_full_area = *overall_layout
        .last()
        .ok_or_eyre("failed to get tooltip area from layout")?;

    // Center the tooltip horizontally like the maze
    let tooltip_area = Layout::horizontal([
        Constraint::Min(1),
        Constraint::Length(maze_columns.max(40)),
        Constraint::Min(1),
    ])
    .split(tooltip_full_area)
    .get(1)
    .copied()
    .ok_or_eyre("failed to get centered tooltip area from horizontal layout")?;

    let main_layout = Layout::vertical([
        Constraint::Min(1),
        Constraint::Length(maze_rows),
        Constraint::Min(1),
    ])
    .split(maze_content_area);

    let maze_area = main_layout
        .get(1)
        .ok_or_eyre("failed to get maze area from layout")?;

    let space = Layout::horizontal([
        Constraint::Min(1),
        Constraint::Length(maze_columns),
        Constraint::Min(1),
    ])
    .split(*maze_area)
    .get(1)
    .copied()
    .ok_or_eyre("failed to get maze space from horizontal layout")?;

    // Pre-compute screen coordinates to handle errors before closures
    let pellets = game.maze().pellets();
    let wall_coords = transform_maze_to_screen_coords(
        grid.positions().filter(|&pos| !grid.is_open(pos)),
        grid,
    )?;
    let pellet_coords = transform_maze_to_screen_coords(pellets.regular.iter().copied(), grid)?;
    let power_coords = transform_maze_to_screen_coords(pellets.power.iter().copied(), grid)?;
    let player_coords = transform_maze_to_screen_coords([game.player().position()], grid)?;
    let mut pursuer_marks = Vec::with_capacity(game.pursuers().len());
    for pursuer in game.pursuers() {
        let coords = transform_maze_to_screen_coords([pursuer.position()], grid)?;
        let glyph = pursuer.name().get(..1).unwrap_or("?");
        pursuer_marks.extend(
            coords
                .into_iter()
                .map(|(x, y)| (x, y, glyph, pursuer_color(pursuer))),
        );
    }

    let x_bounds = [
        (-rounded_div::i32(space.width.into(), 2)).into(),
        (rounded_div::i32(space.width.into(), 2)).into(),
    ];
    let y_bounds = [
        (-rounded_div::i32(space.height.into(), 2)).into(),
        (rounded_div::i32(space.height.into(), 2)).into(),
    ];

    let walls = Canvas::default()
        .x_bounds(x_bounds)
        .y_bounds(y_bounds)
        .marker(Marker::Block)
        .paint(|ctx| {
            ctx.draw(&Points {
                coords: &wall_coords,
                color: Color::Green,
            });
        });
    let items = Canvas::default()
        .x_bounds(x_bounds)
        .y_bounds(y_bounds)
        .marker(Marker::Dot)
        .paint(|ctx| {
            ctx.draw(&Points {
                coords: &pellet_coords,
                color: Color::Gray,
            });
            for &(x, y) in &power_coords {
                ctx.print(x, y, Line::styled("o", Color::White));
            }
            for &(x, y) in &player_coords {
                ctx.print(x, y, Line::styled("@", Color::Yellow));
            }
            for &(x, y, glyph, color) in &pursuer_marks {
                ctx.print(x, y, Line::styled(glyph, color));
            }
        });

    frame.render_widget(hud(app, game), hud_area);
    frame.render_widget(walls, space);
    frame.render_widget(items, space);

    // Render tooltip as a block at the bottom center with top border
    let tooltip_block = Block::bordered()
        .title("(hjkl) move / (esc) menu / (q) quit")
        .title_alignment(Alignment::Center)
        .style(Style::default().fg(Color::Green))
        .border_type(BorderType::Plain)
        .borders(Borders::TOP);

    frame.render_widget(tooltip_block, tooltip_area);

    Ok(())
}
