use crate::parse::dynamic_pattern;
use crate::parse::go::{FunctionDecl, GoFile};
use crate::sdk::overrides;
use crate::sdk::{ClientLookup, ParameterClient, SdkConvention};
use std::collections::HashSet;
use thiserror::Error;

/// The constructor that produced a client variable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientBinding {
    pub receiver: String,
    pub constructor: String,
}

/// Why a client could not be traced back to its constructor.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ClientMiss {
    #[error("{receiver} is a parameter of {function} but no caller passes it")]
    NoCaller { receiver: String, function: String },

    #[error("{caller} passes `{argument}`, which is not a plain variable")]
    ComplexArgument { caller: String, argument: String },

    #[error("no declaration of {receiver} in {function}")]
    Undeclared { receiver: String, function: String },

    #[error("call chain returns to {function}")]
    Cycle { function: String },
}

/// Traces client variables through one resource file.
pub struct ClientResolver<'a> {
    file: &'a GoFile,
    convention: &'a dyn SdkConvention,
}

impl<'a> ClientResolver<'a> {
    pub fn new(file: &'a GoFile, convention: &'a dyn SdkConvention) -> Self {
        Self { file, convention }
    }

    pub fn resolve(
        &self,
        receiver: &str,
        function: &FunctionDecl,
    ) -> Result<ClientBinding, ClientMiss> {
        let mut visited = HashSet::new();
        self.resolve_in(receiver, function, &mut visited)
    }

    fn resolve_in(
        &self,
        receiver: &str,
        function: &'a FunctionDecl,
        visited: &mut HashSet<&'a str>,
    ) -> Result<ClientBinding, ClientMiss> {
        if !visited.insert(function.name.as_str()) {
            return Err(ClientMiss::Cycle {
                function: function.name.clone(),
            });
        }

        let lookup = self.convention.client_lookup();
        if lookup == ClientLookup::DeclarationsFirst {
            if let Some(binding) = self.declared(receiver, function) {
                return Ok(binding);
            }
        }

        let parameters_apply = lookup == ClientLookup::ParametersFirst || !function.method;
        let parameter = if parameters_apply {
            self.convention
                .parameter_client(receiver, self.file.parameters(function))
        } else {
            None
        };
        match parameter {
            Some(ParameterClient::Typed(constructor)) => {
                return Ok(ClientBinding {
                    receiver: receiver.to_string(),
                    constructor,
                });
            }
            Some(ParameterClient::ViaCaller { position }) => {
                let (caller, argument) = self.find_caller(receiver, function, position)?;
                tracing::debug!(
                    "{} receives {} from {} as {}",
                    function.name,
                    receiver,
                    caller.name,
                    argument
                );
                return self.resolve_in(&argument, caller, visited);
            }
            None => {}
        }

        if lookup == ClientLookup::ParametersFirst {
            if let Some(binding) = self.declared(receiver, function) {
                return Ok(binding);
            }
        }
        Err(ClientMiss::Undeclared {
            receiver: receiver.to_string(),
            function: function.name.clone(),
        })
    }

    /// Client bound by a declaration in the body of `function`, including
    /// the irregular chooser calls.
    fn declared(&self, receiver: &str, function: &FunctionDecl) -> Option<ClientBinding> {
        let body = self.file.function_source(function);
        let constructor = self
            .convention
            .declared_client(receiver, body)
            .or_else(|| overrides::chosen_client(receiver, body).map(str::to_string))?;
        Some(ClientBinding {
            receiver: receiver.to_string(),
            constructor,
        })
    }

    /// First other function calling `function`, with the argument it passes
    /// at `position` (1-based).
    fn find_caller(
        &self,
        receiver: &str,
        function: &FunctionDecl,
        position: usize,
    ) -> Result<(&'a FunctionDecl, String), ClientMiss> {
        let no_caller = || ClientMiss::NoCaller {
            receiver: receiver.to_string(),
            function: function.name.clone(),
        };
        let call = dynamic_pattern(&format!(r"\b{}\((.*)\)", regex::escape(&function.name)))
            .ok_or_else(no_caller)?;

        for caller in self.file.functions.iter().filter(|f| f.name != function.name) {
            let src = self.file.function_source(caller);
            let Some(args) = call.captures(src).and_then(|c| c.get(1)) else {
                continue;
            };
            let Some(arg) = args.as_str().split(',').nth(position.saturating_sub(1)) else {
                continue;
            };
            let argument = arg.trim_matches(' ').trim_matches(')').to_string();
            if argument.contains('(') {
                tracing::warn!(
                    "Unable to parse the argument {} passed by {}",
                    argument,
                    caller.name
                );
                return Err(ClientMiss::ComplexArgument {
                    caller: caller.name.clone(),
                    argument,
                });
            }
            return Ok((caller, argument));
        }
        Err(no_caller())
    }
}
