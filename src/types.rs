//! Type definitions and enums for the application state and navigation.

/// Enumeration of available application screens.
///
/// This enumeration holds information about the current screen of the game. This is used to
/// determine which screen to render and what actions to take based on user input.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Screen {
    /// Main menu screen of the game.
    ///
    /// This variant represents the main menu screen of the game.
    MainMenu(MainMenuItem),
    /// Maze generation notice.
    ///
    /// This variant represents the screen drawn right before the synchronous maze generation runs,
    /// so the user knows why the interface stalls for a moment.
    Generating,
    /// In-game screen.
    ///
    /// This variant represents the screen where the maze, the player and the pursuers are drawn
    /// and frames are being played.
    InGame,
    /// End of game screen.
    ///
    /// This variant represents the screen shown once the game is won or lost. It shows the final
    /// score and offers a restart.
    GameEnd(EndMenuItem),
}

/// Main menu navigation options.
///
/// This enumeration holds the different items in the main menu. It is used to determine which items
/// can the user select in the main menu.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum MainMenuItem {
    /// "Start Game" menu option.
    StartGame,
    /// "Quit" menu option.
    Quit,
}

/// End menu navigation options.
///
/// This enumeration holds the different items in the menu shown after a game ends.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum EndMenuItem {
    /// "Restart" menu option, generating a new maze.
    Restart,
    /// "Quit" menu option.
    Quit,
}

/// Generic menu type configuration.
///
/// This enumeration holds the different specifics particular to each generic menu type in the
/// application's interface. Generic here means they share enough features to be considered worth
/// joining together part of their functionality.
pub(crate) enum MenuType {
    /// Main menu configuration.
    MainMenu(u8),
    /// End menu configuration after clearing the board.
    Won(u8),
    /// End menu configuration after losing the last life.
    Lost(u8),
}

impl MenuType {
    /// Returns the string representation of the menu type.
    ///
    /// This function provides the display name for each menu variant, used as the title in the
    /// menu's border when rendering the interface.
    pub(crate) const fn repr(&self) -> &str {
        match self {
            Self::MainMenu(_) => "Main Menu",
            Self::Won(_) => "You Win",
            Self::Lost(_) => "Game Over",
        }
    }

    /// Returns the number of rows the menu lays out.
    ///
    /// This function provides access to the number of menu rows for layout calculations, allowing
    /// the UI to properly size the menu containers.
    pub(crate) const fn value(&self) -> u8 {
        match self {
            Self::MainMenu(value) | Self::Won(value) | Self::Lost(value) => *value,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_screen_variants() {
        let main_menu = Screen::MainMenu(MainMenuItem::StartGame);
        let end_menu = Screen::GameEnd(EndMenuItem::Restart);

        assert_eq!(
            main_menu,
            Screen::MainMenu(MainMenuItem::StartGame),
            "screens compare by value"
        );
        assert_ne!(main_menu, Screen::InGame, "different screens differ");
        assert_ne!(
            end_menu,
            Screen::GameEnd(EndMenuItem::Quit),
            "the selected item is part of the screen"
        );
        assert_ne!(Screen::Generating, Screen::InGame, "generation is its own screen");
    }

    #[test]
    fn test_menu_type_repr() {
        assert_eq!(MenuType::MainMenu(2).repr(), "Main Menu", "main menu title");
        assert_eq!(MenuType::Won(3).repr(), "You Win", "won title");
        assert_eq!(MenuType::Lost(3).repr(), "Game Over", "lost title");
    }

    #[test]
    fn test_menu_type_value() {
        assert_eq!(MenuType::MainMenu(2).value(), 2, "main menu has two rows");
        assert_eq!(MenuType::Won(3).value(), 3, "won menu rows");
        assert_eq!(MenuType::Lost(0).value(), 0, "values are stored as given");
    }

    #[test]
    fn test_debug_implementations() {
        assert_eq!(format!("{:?}", Screen::InGame), "InGame", "screen debug output");
        assert_eq!(
            format!("{:?}", EndMenuItem::Restart),
            "Restart",
            "end item debug output"
        );
    }
}
