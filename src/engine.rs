/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::{
    io,
    sync::mpsc::{channel, Receiver, Sender},
    thread,
};

use anyhow::{bail, Context, Result};

use crate::{Color, EngineCommand, Game};

/// The Tavla backgammon engine.
#[derive(Debug)]
pub struct Engine {
    /// The current state of the backgammon game, as known to the engine.
    ///
    /// This is modified whenever dice are rolled or moves are played,
    /// and is reset whenever the engine is told to start a new game.
    game: Game,

    /// One half of a channel, responsible for sending commands to the engine to execute.
    sender: Sender<EngineCommand>,

    /// One half of a channel, responsible for receiving commands for the engine to execute.
    receiver: Receiver<EngineCommand>,
}

impl Engine {
    /// Constructs a new [`Engine`] instance to be executed with [`Engine::run`].
    pub fn new() -> Self {
        // Construct a channel for communication between the input thread and the engine
        let (sender, receiver) = channel();

        Self {
            game: Game::default(),
            sender,
            receiver,
        }
    }

    /// Returns a string of the engine's name and current version.
    pub fn name(&self) -> String {
        format!("{} {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"))
    }

    /// Sends an [`EngineCommand`] to the engine to be executed.
    pub fn send_command(&self, command: EngineCommand) {
        // Safe unwrap: `send` can only fail if it's corresponding receiver doesn't exist,
        //  and the only way our engine's `Receiver` can no longer exist is when our engine
        //  doesn't exist either, so this is always safe.
        self.sender.send(command).unwrap();
    }

    /// Execute the main event loop for the engine.
    ///
    /// This function spawns a thread to handle input from `stdin` and waits on received commands.
    pub fn run(&mut self) -> Result<()> {
        println!("{}", self.name());

        // Spawn a separate thread for handling user input
        let sender = self.sender.clone();
        thread::spawn(|| {
            if let Err(err) = input_handler(sender) {
                eprintln!("Input handler thread stopping after fatal error: {err}");
            }
        });

        // Loop on user input
        while let Ok(cmd) = self.receiver.recv() {
            match cmd {
                EngineCommand::Bar { pip } => match self.game.send_to_bar(pip) {
                    Ok(color) => println!("{color} checker on {pip} sent to the bar"),
                    Err(e) => eprintln!("Error: {e}"),
                },

                EngineCommand::Display => self.display(),

                EngineCommand::Enter { color, pip } => {
                    match self.game.enter_from_bar(color, pip) {
                        Ok(result) => println!("{result}"),
                        Err(e) => eprintln!("Error: {e}"),
                    }
                }

                EngineCommand::Exit => break,

                EngineCommand::Home { pip } => match self.game.bear_off_from(pip) {
                    Ok(color) => println!("{color} checker on {pip} borne off"),
                    Err(e) => eprintln!("Error: {e}"),
                },

                EngineCommand::HomeBar { color } => {
                    println!("{}", self.game.bear_off_from_bar(color));
                }

                EngineCommand::Move { notation } => {
                    // Keep running, even on an illegal move
                    if let Err(e) = self.game.play(&notation) {
                        eprintln!("Error: {e}");
                    } else if let Some(winner) = self.game.winner() {
                        println!("{winner} wins!");
                    }
                }

                EngineCommand::Moves { pip, bar } => {
                    // Get the legal moves, filtered by origin if requested
                    let moves = self
                        .game
                        .moves()
                        .iter()
                        .flat_map(|roll| {
                            roll.moves()
                                .iter()
                                .filter(|mv| pip.is_none() || mv.from_pip() == pip)
                                .filter(|mv| !bar || mv.from_pip().is_none())
                                .map(move |mv| format!("[{}] {mv}", roll.value()))
                        })
                        .collect::<Vec<_>>();

                    // If there are none, print "(none)"
                    let moves_string = if moves.is_empty() {
                        String::from("(none)")
                    } else {
                        // Otherwise, join them by comma-space
                        moves.join(", ")
                    };
                    println!("{moves_string}");
                }

                EngineCommand::New => self.game = Game::default(),

                EngineCommand::Pass => {
                    self.game.pass_turn();
                    println!("turn: {}", self.game.current_player());
                }

                EngineCommand::Pips => {
                    for color in [Color::White, Color::Black] {
                        let player = self.game.player(color);
                        println!(
                            "{player}: {} pips, {} on the bar, {} borne off",
                            self.game.position().pip_count(player),
                            self.game.position().bar_count(color),
                            self.game.position().home_count(color),
                        );
                    }
                }

                EngineCommand::Roll { first, second } => {
                    let forced = match (first, second) {
                        (Some(first), Some(second)) => Some((first, second)),
                        (None, None) => None,
                        // A half-forced roll is surely a typo
                        _ => {
                            eprintln!("Error: force both faces or neither");
                            continue;
                        }
                    };

                    match self.game.roll_dice(forced) {
                        Ok(dice) => {
                            println!("dice: {dice}");
                            if !self.game.moves().has_moves() {
                                println!("no legal moves; pass");
                            }
                        }
                        Err(e) => eprintln!("Error: {e}"),
                    }
                }
            };
        }

        Ok(())
    }

    /// Executes the `display` command, printing the current game.
    fn display(&self) {
        println!("{}", self.game);
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}

/// Loops endlessly to await input via `stdin`, sending all successfully-parsed commands through the supplied `sender`.
fn input_handler(sender: Sender<EngineCommand>) -> Result<()> {
    let mut buffer = String::with_capacity(2048); // Seems like a good amount of space to pre-allocate

    loop {
        // Clear the buffer, read input, and trim the trailing newline
        buffer.clear();
        let bytes = io::stdin()
            .read_line(&mut buffer)
            .context("Failed to read line when parsing commands")?;

        // For ctrl + d
        if 0 == bytes {
            // Send the Exit command and exit this function
            sender
                .send(EngineCommand::Exit)
                .context("Failed to send 'exit' command after receiving empty input")?;

            bail!("Engine received input of 0 bytes and is quitting");
        }

        // Trim any leading/trailing whitespace
        let buf = buffer.trim();

        // Ignore empty lines
        if buf.is_empty() {
            continue;
        }

        match buf.parse::<EngineCommand>() {
            // If successful, send the command to the engine
            Ok(cmd) => sender
                .send(cmd)
                .context("Failed to send command to engine")?,

            // If an invalid command was received, just print the error and continue running
            Err(err) => eprintln!("{err}"),
        }
    }
}
