//! errors.rs
//! Errores que escapan del despachador. Los fallos por destinatario no
//! están aquí: se guardan como logs con estado ERROR.

use thiserror::Error;

use crate::models::channel_model::ChannelType;

#[derive(Debug, Error)]
pub enum NotifierError {
    /// No hay canal registrado para (tipo, nombre); no se crea ningún log.
    #[error("Canal no configurado: {channel_type}/{channel_name}")]
    UnconfiguredChannel {
        channel_type: ChannelType,
        channel_name: String,
    },

    /// Falló el almacenamiento de logs o de solicitudes.
    #[error("Error de almacenamiento: {0:#}")]
    Storage(#[from] anyhow::Error),
}
