//! Built-in message tables
//!
//! Every table carries the full English key set.

pub(super) type Table = &'static [(&'static str, &'static str)];

pub(super) const ALL: &[(&str, Table)] = &[("en", EN), ("es", ES), ("de", DE), ("fr", FR)];

pub(super) const EN: Table = &[
    // Report
    ("report_title", "Contract Analysis Report"),
    ("contract_name", "Contract"),
    ("analysis_date", "Analysis date"),
    ("executive_summary", "Executive Summary"),
    ("compliance_score", "Compliance Score"),
    ("score_band_low", "Low risk"),
    ("score_band_moderate", "Moderate risk"),
    ("score_band_elevated", "Elevated risk"),
    ("score_band_high", "High risk"),
    ("data_protection_impact", "Data Protection Impact"),
    ("advanced_analysis", "Advanced Analysis"),
    ("effective_date", "Effective date"),
    ("termination_date", "Termination date"),
    ("renewal_date", "Renewal date"),
    ("contract_type", "Contract type"),
    ("contract_value", "Contract value"),
    ("parties", "Parties"),
    ("liability_cap", "Liability cap"),
    ("indemnification", "Indemnification"),
    ("confidentiality", "Confidentiality obligations"),
    ("not_specified", "Not specified"),
    ("view_redlined_clause", "View redlined clause"),
    ("jurisdiction_summaries", "Jurisdiction Summaries"),
    ("applicable_laws", "Applicable laws"),
    ("key_findings", "Key findings"),
    ("risk_level", "Risk level"),
    ("findings", "Findings"),
    ("jurisdiction", "Jurisdiction"),
    ("category", "Category"),
    ("clause_reference", "Clause reference"),
    ("recommendations", "Recommendations"),
    ("risk_high", "High Risk"),
    ("risk_medium", "Medium Risk"),
    ("risk_low", "Low Risk"),
    ("risk_none", "No Risk"),
    ("footer_copyright", "© {year} ContractAnalyser. All rights reserved."),
    (
        "footer_disclaimer",
        "This report was generated automatically and does not constitute legal advice.",
    ),
    // Redlined clause viewer
    ("redlined_title", "Redlined Clause"),
    ("original_clause", "Original clause"),
    ("redlined_version", "Redlined version"),
    ("suggested_revision", "Suggested revision"),
    // Email
    ("email_subject", "Your contract analysis for {contract} is ready"),
    ("email_greeting", "Hello {name},"),
    (
        "email_body",
        "The analysis of {contract} is complete. Compliance score: {score}/100.",
    ),
    ("email_view_report", "View full report"),
    ("email_footer", "You receive this email because report emails are enabled in your settings."),
    // Jurisdictions
    ("jurisdiction_eu", "European Union (EU)"),
    ("jurisdiction_european_union", "European Union (EU)"),
    ("jurisdiction_us", "United States"),
    ("jurisdiction_united_states", "United States"),
    ("jurisdiction_uk", "United Kingdom"),
    ("jurisdiction_united_kingdom", "United Kingdom"),
    ("jurisdiction_germany", "Germany"),
    ("jurisdiction_france", "France"),
    ("jurisdiction_spain", "Spain"),
    ("jurisdiction_international", "International"),
    // Categories
    ("category_data_protection", "Data Protection"),
    ("category_liability", "Liability"),
    ("category_indemnification", "Indemnification"),
    ("category_termination", "Termination"),
    ("category_payment", "Payment Terms"),
    ("category_confidentiality", "Confidentiality"),
    ("category_intellectual_property", "Intellectual Property"),
    ("category_dispute_resolution", "Dispute Resolution"),
    ("category_compliance", "Regulatory Compliance"),
    ("category_general", "General"),
];

pub(super) const ES: Table = &[
    ("report_title", "Informe de Análisis de Contrato"),
    ("contract_name", "Contrato"),
    ("analysis_date", "Fecha de análisis"),
    ("executive_summary", "Resumen Ejecutivo"),
    ("compliance_score", "Puntuación de Cumplimiento"),
    ("score_band_low", "Riesgo bajo"),
    ("score_band_moderate", "Riesgo moderado"),
    ("score_band_elevated", "Riesgo elevado"),
    ("score_band_high", "Riesgo alto"),
    ("data_protection_impact", "Impacto en la Protección de Datos"),
    ("advanced_analysis", "Análisis Avanzado"),
    ("effective_date", "Fecha de entrada en vigor"),
    ("termination_date", "Fecha de terminación"),
    ("renewal_date", "Fecha de renovación"),
    ("contract_type", "Tipo de contrato"),
    ("contract_value", "Valor del contrato"),
    ("parties", "Partes"),
    ("liability_cap", "Límite de responsabilidad"),
    ("indemnification", "Indemnización"),
    ("confidentiality", "Obligaciones de confidencialidad"),
    ("not_specified", "No especificado"),
    ("view_redlined_clause", "Ver cláusula con cambios"),
    ("jurisdiction_summaries", "Resúmenes por Jurisdicción"),
    ("applicable_laws", "Leyes aplicables"),
    ("key_findings", "Hallazgos clave"),
    ("risk_level", "Nivel de riesgo"),
    ("findings", "Hallazgos"),
    ("jurisdiction", "Jurisdicción"),
    ("category", "Categoría"),
    ("clause_reference", "Referencia de cláusula"),
    ("recommendations", "Recomendaciones"),
    ("risk_high", "Riesgo Alto"),
    ("risk_medium", "Riesgo Medio"),
    ("risk_low", "Riesgo Bajo"),
    ("risk_none", "Sin Riesgo"),
    ("footer_copyright", "© {year} ContractAnalyser. Todos los derechos reservados."),
    (
        "footer_disclaimer",
        "Este informe se generó automáticamente y no constituye asesoramiento legal.",
    ),
    ("redlined_title", "Cláusula con Cambios"),
    ("original_clause", "Cláusula original"),
    ("redlined_version", "Versión con cambios"),
    ("suggested_revision", "Revisión sugerida"),
    ("email_subject", "El análisis de su contrato {contract} está listo"),
    ("email_greeting", "Hola {name}:"),
    (
        "email_body",
        "El análisis de {contract} ha finalizado. Puntuación de cumplimiento: {score}/100.",
    ),
    ("email_view_report", "Ver informe completo"),
    ("email_footer", "Recibe este correo porque los informes por correo están activados en su configuración."),
    ("jurisdiction_eu", "Unión Europea (UE)"),
    ("jurisdiction_european_union", "Unión Europea (UE)"),
    ("jurisdiction_us", "Estados Unidos"),
    ("jurisdiction_united_states", "Estados Unidos"),
    ("jurisdiction_uk", "Reino Unido"),
    ("jurisdiction_united_kingdom", "Reino Unido"),
    ("jurisdiction_germany", "Alemania"),
    ("jurisdiction_france", "Francia"),
    ("jurisdiction_spain", "España"),
    ("jurisdiction_international", "Internacional"),
    ("category_data_protection", "Protección de Datos"),
    ("category_liability", "Responsabilidad"),
    ("category_indemnification", "Indemnización"),
    ("category_termination", "Terminación"),
    ("category_payment", "Condiciones de Pago"),
    ("category_confidentiality", "Confidencialidad"),
    ("category_intellectual_property", "Propiedad Intelectual"),
    ("category_dispute_resolution", "Resolución de Disputas"),
    ("category_compliance", "Cumplimiento Normativo"),
    ("category_general", "General"),
];

pub(super) const DE: Table = &[
    ("report_title", "Vertragsanalysebericht"),
    ("contract_name", "Vertrag"),
    ("analysis_date", "Analysedatum"),
    ("executive_summary", "Zusammenfassung"),
    ("compliance_score", "Compliance-Bewertung"),
    ("score_band_low", "Geringes Risiko"),
    ("score_band_moderate", "Mäßiges Risiko"),
    ("score_band_elevated", "Erhöhtes Risiko"),
    ("score_band_high", "Hohes Risiko"),
    ("data_protection_impact", "Auswirkungen auf den Datenschutz"),
    ("advanced_analysis", "Erweiterte Analyse"),
    ("effective_date", "Inkrafttreten"),
    ("termination_date", "Beendigungsdatum"),
    ("renewal_date", "Verlängerungsdatum"),
    ("contract_type", "Vertragsart"),
    ("contract_value", "Vertragswert"),
    ("parties", "Vertragsparteien"),
    ("liability_cap", "Haftungsbegrenzung"),
    ("indemnification", "Freistellung"),
    ("confidentiality", "Vertraulichkeitspflichten"),
    ("not_specified", "Nicht angegeben"),
    ("view_redlined_clause", "Überarbeitete Klausel anzeigen"),
    ("jurisdiction_summaries", "Zusammenfassungen nach Rechtsordnung"),
    ("applicable_laws", "Anwendbare Gesetze"),
    ("key_findings", "Wichtigste Erkenntnisse"),
    ("risk_level", "Risikostufe"),
    ("findings", "Feststellungen"),
    ("jurisdiction", "Rechtsordnung"),
    ("category", "Kategorie"),
    ("clause_reference", "Klauselverweis"),
    ("recommendations", "Empfehlungen"),
    ("risk_high", "Hohes Risiko"),
    ("risk_medium", "Mittleres Risiko"),
    ("risk_low", "Geringes Risiko"),
    ("risk_none", "Kein Risiko"),
    ("footer_copyright", "© {year} ContractAnalyser. Alle Rechte vorbehalten."),
    (
        "footer_disclaimer",
        "Dieser Bericht wurde automatisch erstellt und stellt keine Rechtsberatung dar.",
    ),
    ("redlined_title", "Überarbeitete Klausel"),
    ("original_clause", "Ursprüngliche Klausel"),
    ("redlined_version", "Überarbeitete Fassung"),
    ("suggested_revision", "Vorgeschlagene Änderung"),
    ("email_subject", "Ihre Vertragsanalyse für {contract} ist fertig"),
    ("email_greeting", "Hallo {name},"),
    (
        "email_body",
        "Die Analyse von {contract} ist abgeschlossen. Compliance-Bewertung: {score}/100.",
    ),
    ("email_view_report", "Vollständigen Bericht anzeigen"),
    ("email_footer", "Sie erhalten diese E-Mail, weil Berichts-E-Mails in Ihren Einstellungen aktiviert sind."),
    ("jurisdiction_eu", "Europäische Union (EU)"),
    ("jurisdiction_european_union", "Europäische Union (EU)"),
    ("jurisdiction_us", "Vereinigte Staaten"),
    ("jurisdiction_united_states", "Vereinigte Staaten"),
    ("jurisdiction_uk", "Vereinigtes Königreich"),
    ("jurisdiction_united_kingdom", "Vereinigtes Königreich"),
    ("jurisdiction_germany", "Deutschland"),
    ("jurisdiction_france", "Frankreich"),
    ("jurisdiction_spain", "Spanien"),
    ("jurisdiction_international", "International"),
    ("category_data_protection", "Datenschutz"),
    ("category_liability", "Haftung"),
    ("category_indemnification", "Freistellung"),
    ("category_termination", "Kündigung"),
    ("category_payment", "Zahlungsbedingungen"),
    ("category_confidentiality", "Vertraulichkeit"),
    ("category_intellectual_property", "Geistiges Eigentum"),
    ("category_dispute_resolution", "Streitbeilegung"),
    ("category_compliance", "Regulatorische Compliance"),
    ("category_general", "Allgemein"),
];

pub(super) const FR: Table = &[
    ("report_title", "Rapport d'Analyse de Contrat"),
    ("contract_name", "Contrat"),
    ("analysis_date", "Date d'analyse"),
    ("executive_summary", "Synthèse"),
    ("compliance_score", "Score de Conformité"),
    ("score_band_low", "Risque faible"),
    ("score_band_moderate", "Risque modéré"),
    ("score_band_elevated", "Risque élevé"),
    ("score_band_high", "Risque très élevé"),
    ("data_protection_impact", "Impact sur la Protection des Données"),
    ("advanced_analysis", "Analyse Avancée"),
    ("effective_date", "Date d'entrée en vigueur"),
    ("termination_date", "Date de résiliation"),
    ("renewal_date", "Date de renouvellement"),
    ("contract_type", "Type de contrat"),
    ("contract_value", "Valeur du contrat"),
    ("parties", "Parties"),
    ("liability_cap", "Plafond de responsabilité"),
    ("indemnification", "Indemnisation"),
    ("confidentiality", "Obligations de confidentialité"),
    ("not_specified", "Non précisé"),
    ("view_redlined_clause", "Voir la clause annotée"),
    ("jurisdiction_summaries", "Synthèses par Juridiction"),
    ("applicable_laws", "Lois applicables"),
    ("key_findings", "Constats clés"),
    ("risk_level", "Niveau de risque"),
    ("findings", "Constats"),
    ("jurisdiction", "Juridiction"),
    ("category", "Catégorie"),
    ("clause_reference", "Référence de clause"),
    ("recommendations", "Recommandations"),
    ("risk_high", "Risque Élevé"),
    ("risk_medium", "Risque Moyen"),
    ("risk_low", "Risque Faible"),
    ("risk_none", "Aucun Risque"),
    ("footer_copyright", "© {year} ContractAnalyser. Tous droits réservés."),
    (
        "footer_disclaimer",
        "Ce rapport a été généré automatiquement et ne constitue pas un avis juridique.",
    ),
    ("redlined_title", "Clause Annotée"),
    ("original_clause", "Clause originale"),
    ("redlined_version", "Version annotée"),
    ("suggested_revision", "Révision suggérée"),
    ("email_subject", "L'analyse de votre contrat {contract} est prête"),
    ("email_greeting", "Bonjour {name},"),
    (
        "email_body",
        "L'analyse de {contract} est terminée. Score de conformité : {score}/100.",
    ),
    ("email_view_report", "Voir le rapport complet"),
    ("email_footer", "Vous recevez cet e-mail car les rapports par e-mail sont activés dans vos paramètres."),
    ("jurisdiction_eu", "Union Européenne (UE)"),
    ("jurisdiction_european_union", "Union Européenne (UE)"),
    ("jurisdiction_us", "États-Unis"),
    ("jurisdiction_united_states", "États-Unis"),
    ("jurisdiction_uk", "Royaume-Uni"),
    ("jurisdiction_united_kingdom", "Royaume-Uni"),
    ("jurisdiction_germany", "Allemagne"),
    ("jurisdiction_france", "France"),
    ("jurisdiction_spain", "Espagne"),
    ("jurisdiction_international", "International"),
    ("category_data_protection", "Protection des Données"),
    ("category_liability", "Responsabilité"),
    ("category_indemnification", "Indemnisation"),
    ("category_termination", "Résiliation"),
    ("category_payment", "Conditions de Paiement"),
    ("category_confidentiality", "Confidentialité"),
    ("category_intellectual_property", "Propriété Intellectuelle"),
    ("category_dispute_resolution", "Règlement des Litiges"),
    ("category_compliance", "Conformité Réglementaire"),
    ("category_general", "Général"),
];
