use colored::*;
use std::io::{self, Write};

/// Banner shown when the network client starts
pub fn print_client_banner<W: Write>(out: &mut W, endpoint: &str) -> io::Result<()> {
    writeln!(out, "{}", "--- Chat Client for localchat ---".bold())?;
    writeln!(out, "Connecting to {}", endpoint.cyan())?;
    writeln!(out, "Type \"exit\" to quit.")?;
    writeln!(out)
}

/// Banner shown while the standalone tester loads its model
pub fn print_local_banner<W: Write>(out: &mut W, model_location: &str) -> io::Result<()> {
    writeln!(out, "{}", "--- Local Chatbot Test ---".bold())?;
    writeln!(out, "Loading model from: {}", model_location.cyan())?;
    writeln!(out, "Please wait, this might take a moment...")
}

/// Printed once the standalone tester's model is ready
pub fn print_local_ready<W: Write>(out: &mut W) -> io::Result<()> {
    writeln!(out, "{}", "Model loaded successfully!".green())?;
    writeln!(out, "You can start chatting. Type \"exit\" to quit.")?;
    writeln!(out)
}
